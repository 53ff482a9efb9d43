use langdev_simplify::ident::{camel, pascal, snake};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn label() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z][A-Za-z0-9]{0,8}", 1..5).prop_map(|words| words.join(" "))
}

// ── Entity labels ────────────────────────────────────────────────

#[test]
fn entity_labels_map_as_published() {
    let cases = [
        ("created at", "created_at", "CreatedAt", "createdAt"),
        ("ID", "id", "ID", "id"),
        ("URL", "url", "URL", "url"),
        ("posts count", "posts_count", "PostsCount", "postsCount"),
        ("secret key", "secret_key", "SecretKey", "secretKey"),
        ("replies", "replies", "Replies", "replies"),
    ];
    for (input, s, p, c) in cases {
        assert_eq!(snake(input), s, "snake {input:?}");
        assert_eq!(pascal(input), p, "pascal {input:?}");
        assert_eq!(camel(input), c, "camel {input:?}");
    }
}

proptest! {
    #[test]
    fn identifiers_contain_no_whitespace(label in label()) {
        prop_assert!(!snake(&label).contains(char::is_whitespace));
        prop_assert!(!pascal(&label).contains(char::is_whitespace));
        prop_assert!(!camel(&label).contains(char::is_whitespace));
    }

    #[test]
    fn snake_is_lowercase_words_joined(label in label()) {
        let words: Vec<String> = label.split(' ').map(str::to_lowercase).collect();
        prop_assert_eq!(snake(&label), words.join("_"));
    }

    #[test]
    fn pascal_starts_uppercase(label in label()) {
        let first = pascal(&label).chars().next().unwrap();
        prop_assert!(first.is_uppercase());
    }

    #[test]
    fn camel_starts_lowercase(label in label()) {
        let first = camel(&label).chars().next().unwrap();
        prop_assert!(first.is_lowercase());
    }

    #[test]
    fn camel_and_pascal_agree_ignoring_case(label in label()) {
        prop_assert_eq!(camel(&label).to_lowercase(), pascal(&label).to_lowercase());
        prop_assert_eq!(snake(&label).replace('_', ""), pascal(&label).to_lowercase());
    }
}
