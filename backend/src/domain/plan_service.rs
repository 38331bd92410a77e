use log::info;

use super::access::AccessContext;
use super::errors::{StudioError, StudioResult};
use crate::storage::{Collection, Store};
use shared::{PlanConfig, PlanListResponse, UpdatePlansRequest, UpdatePlansResponse};

#[derive(Clone)]
pub struct PlanService {
    store: Store,
}

impl PlanService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list_plans(&self) -> PlanListResponse {
        let plans = self.store.read(|data| data.plans.clone()).await;
        PlanListResponse { plans }
    }

    /// Replace the plan list. Existing students keep their plan names and
    /// existing payments keep their amounts.
    pub async fn update_plans(
        &self,
        access: &AccessContext,
        request: UpdatePlansRequest,
    ) -> StudioResult<UpdatePlansResponse> {
        access.require_manager("edit plans")?;
        info!("Updating {} plans", request.plans.len());

        validate_plans(&request.plans)?;

        let plans: Vec<PlanConfig> = request
            .plans
            .into_iter()
            .map(|p| PlanConfig {
                id: p.id.trim().to_string(),
                name: p.name.trim().to_string(),
                price: p.price,
            })
            .collect();

        let plans = self
            .store
            .mutate(&[Collection::Plans], |data| {
                data.plans = plans;
                Ok(data.plans.clone())
            })
            .await?;

        Ok(UpdatePlansResponse {
            plans,
            success_message: "Plans updated successfully".to_string(),
        })
    }
}

fn validate_plans(plans: &[PlanConfig]) -> StudioResult<()> {
    for plan in plans {
        if plan.name.trim().is_empty() {
            return Err(StudioError::validation("Plan name cannot be empty"));
        }
        if !plan.price.is_finite() || plan.price < 0.0 {
            return Err(StudioError::validation(format!(
                "Plan '{}' must have a price of zero or more",
                plan.name.trim()
            )));
        }
    }

    let mut names: Vec<&str> = plans.iter().map(|p| p.name.trim()).collect();
    names.sort_unstable();
    if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
        return Err(StudioError::validation(format!("Duplicate plan name '{}'", pair[0])));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{sample_student, seeded_store};

    fn plan(id: &str, name: &str, price: f64) -> PlanConfig {
        PlanConfig {
            id: id.to_string(),
            name: name.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn test_list_plans_returns_seeded_defaults() {
        let (store, _blobs) = seeded_store(Vec::new(), Vec::new(), Vec::new()).await;
        let service = PlanService::new(store);

        let plans = service.list_plans().await.plans;
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[3].name, "Anual - VIP");
    }

    #[tokio::test]
    async fn test_update_plans_keeps_student_plan_names() {
        let (store, blobs) =
            seeded_store(vec![sample_student("1", "Marina Fontoura")], Vec::new(), Vec::new())
                .await;
        let service = PlanService::new(store.clone());

        let request = UpdatePlansRequest {
            plans: vec![plan("1", " Mensal ", 270.0), plan("2", "Anual", 700.0)],
        };
        let response = service
            .update_plans(&AccessContext::Manager, request)
            .await
            .expect("Failed to update plans");

        assert_eq!(response.plans[0].name, "Mensal");
        assert!(blobs.snapshot(Collection::Plans.key()).unwrap().contains("Anual"));

        let student_plan = store.read(|d| d.students[0].plan.clone()).await;
        assert_eq!(student_plan, "Fidelidade - 2x/semana");
    }

    #[tokio::test]
    async fn test_update_plans_validation() {
        let (store, _blobs) = seeded_store(Vec::new(), Vec::new(), Vec::new()).await;
        let service = PlanService::new(store.clone());

        let negative = UpdatePlansRequest {
            plans: vec![plan("1", "Mensal", -1.0)],
        };
        assert!(matches!(
            service.update_plans(&AccessContext::Manager, negative).await,
            Err(StudioError::Validation(_))
        ));

        let unnamed = UpdatePlansRequest {
            plans: vec![plan("1", "  ", 100.0)],
        };
        assert!(service.update_plans(&AccessContext::Manager, unnamed).await.is_err());

        let duplicated = UpdatePlansRequest {
            plans: vec![plan("1", "Mensal", 100.0), plan("2", "Mensal", 200.0)],
        };
        assert!(service.update_plans(&AccessContext::Manager, duplicated).await.is_err());

        let student = UpdatePlansRequest {
            plans: vec![plan("1", "Mensal", 100.0)],
        };
        assert!(matches!(
            service
                .update_plans(&AccessContext::Student("1".to_string()), student)
                .await,
            Err(StudioError::Forbidden(_))
        ));

        assert_eq!(store.read(|d| d.plans.len()).await, 4);
    }
}
