//! Tabs of the studio app and which ones each context gets

use super::access::AccessContext;
use shared::{NavigationItem, NavigationResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Help,
    Calendar,
    Students,
    Payments,
    Notifications,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Dashboard,
        Tab::Help,
        Tab::Calendar,
        Tab::Students,
        Tab::Payments,
        Tab::Notifications,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Help => "help",
            Tab::Calendar => "calendar",
            Tab::Students => "students",
            Tab::Payments => "payments",
            Tab::Notifications => "notifications",
        }
    }

    pub fn from_id(id: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.id() == id)
    }

    pub fn label(self, access: &AccessContext) -> &'static str {
        match (self, access.is_manager()) {
            (Tab::Dashboard, true) => "Painel",
            (Tab::Dashboard, false) => "Início",
            (Tab::Help, _) => "Ajuda",
            (Tab::Calendar, true) => "Agenda",
            (Tab::Calendar, false) => "Minhas Aulas",
            (Tab::Students, _) => "Comunidade",
            (Tab::Payments, true) => "Financeiro",
            (Tab::Payments, false) => "Meus Pagamentos",
            (Tab::Notifications, _) => "Alertas",
        }
    }
}

/// Every context sees every tab; data behind each one is scoped by the
/// services
pub fn navigation(access: &AccessContext) -> NavigationResponse {
    NavigationResponse {
        role: access.role().to_string(),
        items: Tab::ALL
            .into_iter()
            .map(|tab| NavigationItem {
                id: tab.id().to_string(),
                label: tab.label(access).to_string(),
            })
            .collect(),
    }
}
