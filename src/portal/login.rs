//! Login form scraping.
//!
//! The portal's landing page carries anti-forgery tokens and view state in
//! hidden inputs. They are echoed back together with the credentials.

use scraper::{Html, Selector};

use crate::portal::session::Credentials;

/// Form field names the portal expects for credentials.
pub const USERNAME_FIELD: &str = "Username";
pub const PASSWORD_FIELD: &str = "Password";

/// Collect `name`/`value` pairs of every `<input type="hidden">`, in page order.
///
/// Inputs without a name are skipped; a missing value is sent as empty.
pub fn hidden_fields(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(r#"input[type="hidden"]"#) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let name = el.value().attr("name")?;
            let value = el.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Build the login POST body: hidden fields plus credentials.
///
/// Later duplicates overwrite earlier values in place, so each field is sent
/// once.
pub fn login_form(
    hidden: Vec<(String, String)>,
    credentials: &Credentials,
) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = Vec::with_capacity(hidden.len() + 2);
    let credential_fields = [
        (USERNAME_FIELD.to_string(), credentials.username.clone()),
        (PASSWORD_FIELD.to_string(), credentials.password().to_string()),
    ];
    for (name, value) in hidden.into_iter().chain(credential_fields) {
        match form.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => form.push((name, value)),
        }
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"
        <html><body>
          <form method="post">
            <input type="hidden" name="__RequestVerificationToken" value="csrf-123">
            <input type="hidden" name="ReturnUrl" value="/">
            <input type="hidden" value="nameless">
            <input type="hidden" name="Flag">
            <input type="text" name="Username" value="">
            <input type="password" name="Password">
          </form>
        </body></html>
    "#;

    #[test]
    fn scrapes_named_hidden_inputs_only() {
        let fields = hidden_fields(LANDING);
        assert_eq!(
            fields,
            vec![
                ("__RequestVerificationToken".to_string(), "csrf-123".to_string()),
                ("ReturnUrl".to_string(), "/".to_string()),
                ("Flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn page_without_form_has_no_fields() {
        assert!(hidden_fields("<html><body>maintenance</body></html>").is_empty());
    }

    #[test]
    fn credentials_are_appended() {
        let creds = Credentials::new("cbvt", "secret");
        let form = login_form(hidden_fields(LANDING), &creds);
        assert_eq!(form.len(), 5);
        assert_eq!(form[3], ("Username".to_string(), "cbvt".to_string()));
        assert_eq!(form[4], ("Password".to_string(), "secret".to_string()));
    }

    #[test]
    fn credentials_overwrite_hidden_fields_with_same_name() {
        let hidden = vec![
            ("Username".to_string(), "prefilled".to_string()),
            ("X".to_string(), "1".to_string()),
            ("X".to_string(), "2".to_string()),
        ];
        let form = login_form(hidden, &Credentials::new("real", "pw"));
        assert_eq!(
            form,
            vec![
                ("Username".to_string(), "real".to_string()),
                ("X".to_string(), "2".to_string()),
                ("Password".to_string(), "pw".to_string()),
            ]
        );
    }
}
