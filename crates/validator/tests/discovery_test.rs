//! Discovery behavior: caching, member filtering, inheritance and
//! extraction, exercised through the public validator API.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use veritas_validator::prelude::*;

// ============================================================================
// FIXTURES
// ============================================================================

struct Article {
    title: String,
    body: String,
    draft_note: String,
    internal_ref: u64,
}

impl Subject for Article {
    fn schema() -> Result<Schema, ValidatorError> {
        Ok(Schema::builder::<Self>()
            .member(
                member("title", |article: &Self| article.title.clone())
                    .rules(rules![required(), min_length(3)]),
            )
            .member(member("body", |article: &Self| article.body.clone()).rule(required()))
            .member(
                member("draft_note", |article: &Self| article.draft_note.clone())
                    .protected()
                    .rule(max_length(10)),
            )
            .member(
                member("internal_ref", |article: &Self| article.internal_ref)
                    .private()
                    .rule(min(1.0)),
            )
            .member(
                member("schema_version", |_article: &Self| 2)
                    .static_member()
                    .rule(min(2.0)),
            )
            .finish())
    }
}

fn article() -> Article {
    Article {
        title: "Intro to embeddings".to_owned(),
        body: "Some text".to_owned(),
        draft_note: "wip".to_owned(),
        internal_ref: 7,
    }
}

struct Content {
    id: u64,
    title: String,
}

fn content_schema() -> Schema {
    Schema::builder::<Content>()
        .member(member("id", |content: &Content| content.id).rule(min(1.0)))
        .member(member("title", |content: &Content| content.title.clone()).rule(min_length(1)))
        .method("audit", |_value, _ctx| {
            RuleOutcome::fail("audit", "content audit")
        })
        .finish()
}

struct Post {
    content: Content,
    title: String,
    tags: Vec<String>,
}

impl Subject for Post {
    fn schema() -> Result<Schema, ValidatorError> {
        Ok(Schema::builder::<Self>()
            .member(member("title", |post: &Self| post.title.clone()).rule(min_length(5)))
            .member(member("tags", |post: &Self| post.tags.clone()))
            .method("audit", |_value, _ctx| RuleOutcome::valid())
            .inherits(content_schema(), |post: &Self| &post.content)
            .finish())
    }
}

fn post() -> Post {
    Post {
        content: Content {
            id: 9,
            title: "base".to_owned(),
        },
        title: "hello world".to_owned(),
        tags: vec!["rust".to_owned()],
    }
}

// ============================================================================
// CACHING
// ============================================================================

#[test]
fn cached_discoveries_return_the_same_rule_set() {
    let validator = Validator::new();
    let first = validator.rules_for::<Article>().unwrap();
    let second = validator.rules_for::<Article>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(validator.cache().len(), 1);
}

#[test]
fn disabled_caching_instantiates_fresh_rule_sets() {
    let validator = Validator::builder().use_cache(false).build();
    let first = validator.rules_for::<Article>().unwrap();
    let second = validator.rules_for::<Article>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(validator.cache().is_empty());
}

#[test]
fn validator_clones_share_discoveries() {
    let validator = Validator::new();
    let clone = validator.clone();
    let first = validator.rules_for::<Article>().unwrap();
    let second = clone.rules_for::<Article>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn different_filters_share_a_cache_without_colliding() {
    let cache = Arc::new(DiscoveryCache::new());
    let wide = Validator::builder().cache(Arc::clone(&cache)).build();
    let narrow = Validator::builder()
        .cache(Arc::clone(&cache))
        .visibility(VisibilityMask::PUBLIC)
        .build();

    let all_members = wide.members_of::<Article>().unwrap();
    let public_members = narrow.members_of::<Article>().unwrap();

    assert_eq!(
        all_members.names().collect::<Vec<_>>(),
        ["title", "body", "draft_note", "internal_ref"]
    );
    assert_eq!(
        public_members.names().collect::<Vec<_>>(),
        ["title", "body"]
    );
    assert_eq!(cache.len(), 2);
}

#[test]
fn slots_fill_incrementally_without_rebuilding_earlier_artifacts() {
    let validator = Validator::new();
    let members = validator.members_of::<Article>().unwrap();

    // validate needs the rule set too; the member set must be reused
    let report = validator.validate(&article()).unwrap();
    assert!(report.is_valid());

    let again = validator.members_of::<Article>().unwrap();
    assert!(Arc::ptr_eq(&members, &again));
    let key = DiscoveryKey::of::<Article>(validator.options());
    assert!(validator.cache().has(&key, CacheItem::Rules));
    assert!(validator.cache().has(&key, CacheItem::Schema));
}

#[test]
fn clearing_the_cache_forces_rediscovery() {
    let validator = Validator::new();
    let first = validator.rules_for::<Article>().unwrap();
    validator.cache().clear();
    let second = validator.rules_for::<Article>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

// ============================================================================
// MEMBER FILTERING
// ============================================================================

#[rstest]
#[case::public_only(VisibilityMask::PUBLIC, vec!["title", "body"])]
#[case::public_and_protected(
    VisibilityMask::PUBLIC | VisibilityMask::PROTECTED,
    vec!["title", "body", "draft_note"]
)]
#[case::private_only(VisibilityMask::PRIVATE, vec!["internal_ref"])]
#[case::everything(VisibilityMask::ALL, vec!["title", "body", "draft_note", "internal_ref"])]
fn visibility_masks_select_members(#[case] mask: VisibilityMask, #[case] expected: Vec<&str>) {
    let validator = Validator::builder().visibility(mask).build();
    let members = validator.members_of::<Article>().unwrap();
    assert_eq!(members.names().collect::<Vec<_>>(), expected);
}

#[test]
fn static_members_join_only_when_asked() {
    let including = Validator::builder().skip_static(false).build();
    let members = including.members_of::<Article>().unwrap();
    assert!(members.contains("schema_version"));

    let skipping = Validator::new();
    let members = skipping.members_of::<Article>().unwrap();
    assert!(!members.contains("schema_version"));
}

#[test]
fn filtered_out_members_are_not_validated() {
    // internal_ref of 0 would fail min(1.0), but the filter drops it
    let validator = Validator::builder()
        .visibility(VisibilityMask::PUBLIC)
        .build();
    let broken_ref = Article {
        internal_ref: 0,
        ..article()
    };
    let report = validator.validate(&broken_ref).unwrap();
    assert!(report.is_valid());
}

// ============================================================================
// EXTRACTION
// ============================================================================

#[test]
fn extraction_keeps_declaration_order() {
    let validator = Validator::new();
    let extractor = validator.extract(&article()).unwrap();
    let data = extractor.data();
    assert_eq!(
        data.keys().collect::<Vec<_>>(),
        ["title", "body", "draft_note", "internal_ref"]
    );
    assert_eq!(extractor.value("internal_ref"), Some(&json!(7)));
    assert!(extractor.has("title"));
    assert!(!extractor.has("schema_version"));
    assert!(extractor.value("schema_version").is_none());
}

#[test]
fn foreign_instances_fail_extraction() {
    struct Unrelated;

    let validator = Validator::new();
    let members = validator.members_of::<Article>().unwrap();
    let err = Extractor::new(&Unrelated, members).unwrap_err();
    assert!(matches!(err, ValidatorError::SubjectMismatch { .. }));
}

// ============================================================================
// VALIDATION THROUGH DISCOVERY
// ============================================================================

#[test]
fn failures_land_under_member_paths() {
    let validator = Validator::new();
    let broken = Article {
        title: "no".to_owned(),
        body: String::new(),
        draft_note: "a prolonged note".to_owned(),
        internal_ref: 0,
    };

    let report = validator.validate(&broken).unwrap();
    assert_eq!(report.len(), 4);
    assert_eq!(
        report.paths().collect::<Vec<_>>(),
        ["title", "body", "draft_note", "internal_ref"]
    );
    assert_eq!(report.errors_at("title")[0].code, "min_length");
    assert_eq!(report.errors_at("body")[0].code, "required");
    assert_eq!(report.errors_at("draft_note")[0].code, "max_length");
    assert_eq!(report.errors_at("internal_ref")[0].code, "min");
}

#[test]
fn malformed_declarations_abort_discovery() {
    struct Broken;

    impl Subject for Broken {
        fn schema() -> Result<Schema, ValidatorError> {
            Ok(Schema::builder::<Self>()
                .member(member("slug", |_broken: &Self| "x").rule(pattern("[unclosed")?))
                .finish())
        }
    }

    let validator = Validator::new();
    let err = validator.rules_for::<Broken>().unwrap_err();
    assert!(matches!(err, ValidatorError::InvalidDeclaration { .. }));
}

#[test]
fn empty_schemas_validate_cleanly() {
    struct Bare;

    impl Subject for Bare {
        fn schema() -> Result<Schema, ValidatorError> {
            Ok(Schema::builder::<Self>().finish())
        }
    }

    let validator = Validator::new();
    let report = validator.validate(&Bare).unwrap();
    assert!(report.is_valid());
    assert!(validator.rules_for::<Bare>().unwrap().is_empty());
}

// ============================================================================
// INHERITANCE
// ============================================================================

#[test]
fn inherited_members_follow_own_ones() {
    let schema = Post::schema().unwrap();
    assert_eq!(
        schema.member_names().collect::<Vec<_>>(),
        ["title", "tags", "id"]
    );
}

#[test]
fn own_declarations_shadow_inherited_ones() {
    let schema = Post::schema().unwrap();

    let decls = schema.member_decls("title");
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].name(), "min_length");

    let audit = schema.method("audit").unwrap();
    assert!(audit(None, &ValidationContext::new()).is_valid());
}

#[test]
fn inherited_accessors_read_child_instances() {
    let validator = Validator::new();
    let extractor = validator.extract(&post()).unwrap();
    assert_eq!(extractor.value("id"), Some(&json!(9)));
    assert_eq!(extractor.value("title"), Some(&json!("hello world")));
    assert_eq!(extractor.value("tags"), Some(&json!(["rust"])));
}

#[test]
fn inherited_rules_keep_guarding_child_subjects() {
    let validator = Validator::new();
    let broken = Post {
        content: Content {
            id: 0,
            title: "base".to_owned(),
        },
        title: "hey".to_owned(),
        tags: Vec::new(),
    };

    let report = validator.validate(&broken).unwrap();
    // the shadowed title rule runs, not the inherited min_length(1)
    assert_eq!(report.errors_at("title")[0].code, "min_length");
    assert_eq!(report.errors_at("title")[0].param("min"), Some(&json!(5)));
    assert_eq!(report.errors_at("id")[0].code, "min");
}
