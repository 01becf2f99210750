//! Model-level unit tests.

#[cfg(test)]
mod model_tests {
    use super::super::field::FieldUpdate;
    use super::super::paste::*;
    use crate::constants::{MAX_CONTENT_CHARS, MAX_TITLE_CHARS};
    use crate::error::AppError;
    use crate::share_id::ShareId;
    use chrono::{Duration, Utc};

    fn sample_paste(is_draft: bool) -> Paste {
        Paste::new(
            UserId::new(),
            "release notes",
            "v1.2.0 fixes the login redirect".to_string(),
            is_draft,
            None,
            ShareId::new("ab12cd34ef56ab78"),
            Utc::now(),
        )
    }

    #[test]
    fn paste_new_trims_title_and_starts_unviewed() {
        let now = Utc::now();
        let paste = Paste::new(
            UserId::new(),
            "  spaced title  ",
            "body".to_string(),
            false,
            None,
            ShareId::new("deadbeefdeadbeef"),
            now,
        );

        assert_eq!(paste.title, "spaced title");
        assert_eq!(paste.view_count, 0);
        assert_eq!(paste.created_at, now);
        assert_eq!(paste.updated_at, now);
    }

    #[test]
    fn published_paste_requires_title_and_content() {
        let mut paste = sample_paste(false);
        paste.title = String::new();
        let err = paste.validate().expect_err("empty title must fail");
        assert!(matches!(err, AppError::Validation { field: "title", .. }));

        let mut paste = sample_paste(false);
        paste.content = "   \n\t".to_string();
        let err = paste.validate().expect_err("blank content must fail");
        assert!(matches!(
            err,
            AppError::Validation {
                field: "content",
                ..
            }
        ));
    }

    #[test]
    fn draft_paste_may_be_empty() {
        let mut paste = sample_paste(true);
        paste.title = String::new();
        paste.content = String::new();
        paste.validate().expect("drafts may be empty");
    }

    #[test]
    fn length_caps_count_characters_not_bytes() {
        // Multibyte characters: at the cap in chars even though the byte
        // length is far larger.
        let title_at_cap: String = "é".repeat(MAX_TITLE_CHARS);
        validate_length_caps(&title_at_cap, "body").expect("title at cap is valid");

        let title_over_cap: String = "é".repeat(MAX_TITLE_CHARS + 1);
        let err = validate_length_caps(&title_over_cap, "body").expect_err("over cap");
        assert!(matches!(err, AppError::Validation { field: "title", .. }));

        let content_over_cap: String = "x".repeat(MAX_CONTENT_CHARS + 1);
        let err = validate_length_caps("t", &content_over_cap).expect_err("over cap");
        assert!(matches!(
            err,
            AppError::Validation {
                field: "content",
                ..
            }
        ));
    }

    #[test]
    fn expiry_comparison_is_strict() {
        let now = Utc::now();
        let mut paste = sample_paste(false);
        paste.expires_at = Some(now);

        assert!(
            !paste.is_expired(now),
            "a paste read exactly at its expiry instant is still live"
        );
        assert!(paste.is_expired(now + Duration::milliseconds(1)));
        assert!(!paste.is_expired(now - Duration::milliseconds(1)));
    }

    #[test]
    fn future_expiry_validation_rejects_now_and_past() {
        let now = Utc::now();
        validate_future_expiry(now + Duration::seconds(1), now).expect("future is valid");

        let err = validate_future_expiry(now, now).expect_err("exactly now is invalid");
        assert!(matches!(
            err,
            AppError::Validation {
                field: "expires_at",
                ..
            }
        ));
        assert!(validate_future_expiry(now - Duration::seconds(1), now).is_err());
    }

    #[test]
    fn field_update_deserializes_absent_null_and_value_distinctly() {
        let absent: UpdatePasteRequest = serde_json::from_str("{}").expect("parse");
        assert_eq!(absent.title, FieldUpdate::Keep);
        assert_eq!(absent.expires_at, FieldUpdate::Keep);

        let cleared: UpdatePasteRequest =
            serde_json::from_str(r#"{"title": null, "expires_at": null}"#).expect("parse");
        assert_eq!(cleared.title, FieldUpdate::Clear);
        assert_eq!(cleared.expires_at, FieldUpdate::Clear);

        let set: UpdatePasteRequest =
            serde_json::from_str(r#"{"title": "renamed", "is_draft": true}"#).expect("parse");
        assert_eq!(set.title, FieldUpdate::Set("renamed".to_string()));
        assert_eq!(set.is_draft, FieldUpdate::Set(true));
        assert_eq!(set.content, FieldUpdate::Keep);
    }

    #[test]
    fn apply_patch_keeps_clears_and_sets_fields() {
        let mut paste = sample_paste(false);
        let now = paste.created_at;
        let later = now + Duration::seconds(30);
        paste.expires_at = Some(now + Duration::days(1));

        let patch = UpdatePasteRequest {
            title: FieldUpdate::Set("  renamed  ".to_string()),
            content: FieldUpdate::Keep,
            is_draft: FieldUpdate::Set(true),
            expires_at: FieldUpdate::Clear,
        };
        paste.apply_patch(patch, later);

        assert_eq!(paste.title, "renamed", "set titles are trimmed");
        assert_eq!(paste.content, "v1.2.0 fixes the login redirect");
        assert!(paste.is_draft);
        assert_eq!(paste.expires_at, None, "cleared expiry means never expires");
        assert_eq!(paste.updated_at, later);
        assert_eq!(paste.created_at, now, "created_at never moves");
    }

    #[test]
    fn apply_patch_clear_resets_draft_flag_to_published() {
        let mut paste = sample_paste(true);
        let patch = UpdatePasteRequest {
            is_draft: FieldUpdate::Clear,
            ..UpdatePasteRequest::default()
        };
        paste.apply_patch(patch, Utc::now());
        assert!(!paste.is_draft, "cleared draft flag resets to false");
    }

    #[test]
    fn ids_round_trip_through_display_and_from_str() {
        let paste_id = PasteId::new();
        let parsed: PasteId = paste_id.to_string().parse().expect("parse paste id");
        assert_eq!(parsed, paste_id);

        let user_id = UserId::new();
        let parsed: UserId = user_id.to_string().parse().expect("parse user id");
        assert_eq!(parsed, user_id);

        assert!("not-a-uuid".parse::<PasteId>().is_err());
    }
}
