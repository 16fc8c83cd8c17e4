//! Validating a submitted article form end to end.
//!
//! Demonstrates schema declaration, skip semantics, conditional and
//! element-wise rules, typed nesting, method callbacks and report
//! rendering.

use serde_json::json;
use veritas_validator::prelude::*;

struct AuthorForm {
    name: String,
    contact: String,
}

impl Subject for AuthorForm {
    fn schema() -> Result<Schema, ValidatorError> {
        Ok(Schema::builder::<Self>()
            .member(
                member("name", |author: &Self| author.name.clone())
                    .rules(rules![required(), min_length(2)]),
            )
            .member(
                member("contact", |author: &Self| author.contact.clone())
                    .rule(pattern(r"^[^@\s]+@[^@\s]+$")?.skip_on_empty()),
            )
            .finish())
    }
}

struct ArticleForm {
    title: String,
    slug: String,
    body: String,
    tags: Vec<String>,
    author: AuthorForm,
    published: bool,
}

impl Subject for ArticleForm {
    fn schema() -> Result<Schema, ValidatorError> {
        Ok(Schema::builder::<Self>()
            .member(
                member("title", |form: &Self| form.title.clone()).rules(rules![
                    required(),
                    min_length(3),
                    // pointless to measure the upper bound once the lower
                    // bound already failed
                    max_length(120).skip_on_error(),
                ]),
            )
            .member(
                member("slug", |form: &Self| form.slug.clone())
                    .rule(pattern(r"^[a-z0-9]+(-[a-z0-9]+)*$")?.skip_on_empty()),
            )
            .member(
                member("body", |form: &Self| form.body.clone()).rule(when(
                    |_value: Option<&Value>, ctx: &ValidationContext| {
                        ctx.top_value("published")
                            .and_then(Value::as_bool)
                            .unwrap_or(false)
                    },
                    min_length(80),
                )),
            )
            .member(member("tags", |form: &Self| form.tags.clone()).rule(Each::new(min_length(2))))
            .member(
                member("author", |form: &Self| {
                    json!({"name": form.author.name, "contact": form.author.contact})
                })
                .rule(Nested::of::<AuthorForm>()),
            )
            .member(member("published", |form: &Self| form.published))
            .rule(Callback::method("slug_matches_title"))
            .method("slug_matches_title", |value, _ctx| {
                let form = value.and_then(Value::as_object);
                let title = form
                    .and_then(|form| form.get("title"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let slug = form
                    .and_then(|form| form.get("slug"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let expected = title
                    .to_lowercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("-");
                RuleOutcome::check(slug.is_empty() || slug == expected, || {
                    ValidationError::new(
                        "slug_mismatch",
                        "Slug must be the lowercased, dash-joined title",
                    )
                })
            })
            .finish())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let validator = Validator::new();

    // Example 1: a submission that fails in several places at once
    let draft = ArticleForm {
        title: String::new(),
        slug: "Embedding-INTRO!".to_owned(),
        body: "Too short.".to_owned(),
        tags: vec!["rust".to_owned(), "x".to_owned()],
        author: AuthorForm {
            name: "A".to_owned(),
            contact: String::new(),
        },
        published: true,
    };
    let report = validator.validate(&draft)?;
    println!("1. Rejected submission, {} error(s)", report.len());
    for (path, errors) in report.iter() {
        for error in errors {
            if path.is_empty() {
                println!("   - {}", error.message);
            } else {
                println!("   - {path}: {}", error.message);
            }
        }
    }

    // Example 2: the same form, fixed up
    let fixed = ArticleForm {
        title: "Intro to Embeddings".to_owned(),
        slug: "intro-to-embeddings".to_owned(),
        body: "This walkthrough builds a tiny semantic search engine, then layers embeddings \
               on top of it step by step."
            .to_owned(),
        tags: vec!["rust".to_owned(), "search".to_owned()],
        author: AuthorForm {
            name: "Alice".to_owned(),
            contact: "alice@example.com".to_owned(),
        },
        published: true,
    };
    let report = validator.validate(&fixed)?;
    println!("\n2. Clean submission: {report}");

    // Example 3: raw data (a decoded request body) with ad hoc rules
    let rules = RuleSet::new()
        .member_rules("username", rules![required(), min_length(3)])
        .member_rules("password", rules![required(), min_length(8)])
        .member_rules("confirm", rules![same_as("password")]);
    let signup: MapData = [
        ("username", json!("alice")),
        ("password", json!("hunter2hunter2")),
        ("confirm", json!("hunter2")),
    ]
    .into_iter()
    .collect();
    let report = validator.validate_data(&signup, &rules)?;
    println!("\n3. Raw sign-up data");
    print!("{report}");

    // Example 4: reports serialize for API responses
    println!("\n4. As JSON:\n{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
