// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for comments, extension scripts, and URL uploads.

use crate::args::parse_absolute_url;
use vq_core::{ActionCode, ParsedStep, Selector, StepMeta};
use vq_error::PlatformError;

pub(crate) fn comment(args: &[String]) -> ParsedStep {
    ParsedStep::bare(ActionCode::Misc)
        .with_value(args[0].clone())
        .with_meta(StepMeta::Comment)
}

pub(crate) fn execute_script(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let name = args[0].trim();
    if name.is_empty() {
        return Err(PlatformError::validation("script name must not be empty"));
    }
    Ok(ParsedStep::bare(ActionCode::Execute).with_value(name.to_string()))
}

pub(crate) fn upload_url(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let url = parse_absolute_url("url", &args[0])?;
    Ok(ParsedStep::bare(ActionCode::Upload)
        .with_target(Selector::infer(&args[1]).into())
        .with_value(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn comment_is_misc_with_meta() {
        let v = serde_json::to_value(comment(&s(&["reviewed 2024-03"]))).unwrap();
        assert_eq!(v["action"], "MISC");
        assert_eq!(v["value"], "reviewed 2024-03");
        assert_eq!(v["meta"], json!({"kind": "COMMENT"}));
    }

    #[test]
    fn execute_script_carries_name() {
        let v = serde_json::to_value(execute_script(&s(&["seed-data"])).unwrap()).unwrap();
        assert_eq!(v["action"], "EXECUTE");
        assert_eq!(v["value"], "seed-data");
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn upload_url_validates_url() {
        assert!(upload_url(&s(&["not-a-url", "#file"])).is_err());
        let v = serde_json::to_value(
            upload_url(&s(&["https://cdn.example.com/fixture.pdf", "#file"])).unwrap(),
        )
        .unwrap();
        assert_eq!(v["action"], "UPLOAD");
        assert_eq!(v["value"], "https://cdn.example.com/fixture.pdf");
        assert_eq!(v["target"]["selectors"][0]["value"], "#file");
    }
}
