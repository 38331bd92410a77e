//! Access, WhatsApp and e-mail links handed to the manager after enrollment

use anyhow::{Context, Result};
use url::Url;

/// Individual access link: the app URL with `studentId=<id>` in the query
pub fn access_link(public_url: &str, student_id: &str) -> Result<String> {
    let mut url = Url::parse(public_url)
        .with_context(|| format!("Invalid public URL '{}'", public_url))?;
    url.query_pairs_mut().append_pair("studentId", student_id);
    Ok(url.to_string())
}

/// Digits only, with the Brazilian country code prepended to 11-digit numbers
pub fn sanitize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 {
        format!("55{}", digits)
    } else {
        digits
    }
}

pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        sanitize_phone(phone),
        urlencoding::encode(text)
    )
}

pub fn mailto_link(email: &str, access_link: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        email,
        urlencoding::encode("Bem-vindo ao Studio"),
        urlencoding::encode(&format!("Acesse: {}", access_link))
    )
}
