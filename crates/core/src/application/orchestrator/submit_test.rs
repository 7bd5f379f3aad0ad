//! Unit tests for submit validation

#[cfg(test)]
mod tests {
    use super::super::submit::*;

    #[test]
    fn test_validate_playbook_empty() {
        let req = SubmitRunRequest::new("   ");

        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_playbook_too_long() {
        let req = SubmitRunRequest::new(format!("{}.yml", "a".repeat(300)));

        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_validate_extra_var_names() {
        let bad = SubmitRunRequest::new("deploy.yml").with_var("app version", "1.0.0");
        let result = validate_request(&bad);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("app version"));

        let leading_digit = SubmitRunRequest::new("deploy.yml").with_var("1st", "x");
        assert!(validate_request(&leading_digit).is_err());

        let good = SubmitRunRequest::new("deploy.yml")
            .with_var("version", "1.0.0")
            .with_var("_private_flag", "true");
        assert!(validate_request(&good).is_ok());
    }

    #[test]
    fn test_values_are_not_restricted() {
        let req = SubmitRunRequest::new("deploy.yml").with_var("motd", "hello world; 'quoted'");
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_blank_inventory_means_none() {
        let req = SubmitRunRequest::new("deploy.yml").with_inventory("  ");
        assert!(validate_request(&req).is_ok());
        assert_eq!(req.inventory_name(), None);

        let named = SubmitRunRequest::new("deploy.yml").with_inventory("production");
        assert_eq!(named.inventory_name(), Some("production"));
    }

    #[test]
    fn test_originator_defaults_to_unknown() {
        assert_eq!(SubmitRunRequest::new("a.yml").originator(), "unknown");
        assert_eq!(
            SubmitRunRequest::new("a.yml")
                .triggered_by("10.0.0.7")
                .originator(),
            "10.0.0.7"
        );
    }
}
