// ABOUTME: Integration tests for validated registry identifiers.
// ABOUTME: Tests parsing and validation of repository names, tags, and digests.

use regsweep::types::*;

mod repository_name_tests {
    use super::*;

    #[test]
    fn valid_nested_name() {
        let name = RepositoryName::new("team/service-a/api").unwrap();
        assert_eq!(name.as_str(), "team/service-a/api");
        assert_eq!(name.to_string(), "team/service-a/api");
    }

    #[test]
    fn empty_returns_error() {
        assert!(matches!(
            RepositoryName::new(""),
            Err(RepositoryNameError::Empty)
        ));
    }

    #[test]
    fn uppercase_returns_error() {
        assert!(matches!(
            RepositoryName::new("Team/app"),
            Err(RepositoryNameError::NotLowercase)
        ));
    }

    #[test]
    fn empty_components_return_error() {
        for name in ["/app", "app/", "team//app"] {
            assert!(
                matches!(
                    RepositoryName::new(name),
                    Err(RepositoryNameError::EmptyComponent)
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_char_returns_error() {
        assert!(matches!(
            RepositoryName::new("team/app:v1"),
            Err(RepositoryNameError::InvalidChar(':'))
        ));
    }

    #[test]
    fn too_long_returns_error() {
        let name = "a".repeat(257);
        assert!(matches!(
            RepositoryName::new(&name),
            Err(RepositoryNameError::TooLong)
        ));
    }
}

mod tag_name_tests {
    use super::*;

    #[test]
    fn valid_tags() {
        for tag in ["latest", "v1.2.3", "build_42", "Release-Candidate"] {
            assert_eq!(TagName::new(tag).unwrap().as_str(), tag);
        }
    }

    #[test]
    fn empty_returns_error() {
        assert!(matches!(TagName::new(""), Err(TagNameError::Empty)));
    }

    #[test]
    fn leading_period_or_hyphen_returns_error() {
        assert!(matches!(
            TagName::new(".hidden"),
            Err(TagNameError::InvalidStart('.'))
        ));
        assert!(matches!(
            TagName::new("-dash"),
            Err(TagNameError::InvalidStart('-'))
        ));
    }

    #[test]
    fn slash_returns_error() {
        assert!(matches!(
            TagName::new("feature/x"),
            Err(TagNameError::InvalidChar('/'))
        ));
    }

    #[test]
    fn max_length_is_128() {
        assert!(TagName::new(&"a".repeat(128)).is_ok());
        assert!(matches!(
            TagName::new(&"a".repeat(129)),
            Err(TagNameError::TooLong)
        ));
    }
}

mod digest_tests {
    use super::*;

    #[test]
    fn display_round_trips_input() {
        let value = "sha256:9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        let digest = Digest::parse(value).unwrap();
        assert_eq!(digest.to_string(), value);
        assert_eq!(digest.algorithm(), "sha256");
    }

    #[test]
    fn empty_encoded_returns_error() {
        assert!(matches!(
            Digest::parse("sha256:"),
            Err(DigestError::EmptyEncoded)
        ));
    }

    #[test]
    fn empty_returns_error() {
        assert!(matches!(Digest::parse(""), Err(DigestError::Empty)));
    }

    #[test]
    fn invalid_encoded_char_returns_error() {
        assert!(matches!(
            Digest::parse("sha256:ab/cd"),
            Err(DigestError::InvalidChar('/'))
        ));
    }
}
