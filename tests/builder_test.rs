//! Integration tests for descriptor builders.

use halberd::builder::{
    FacetBuilder, FuzzyLikeThisFieldQueryBuilder, QueryBuilder, TermFilterBuilder,
    TermsFacetBuilder,
};
use halberd::error::HalberdError;
use serde_json::json;

#[test]
fn test_fuzzy_like_this_without_text_fails() {
    let err = FuzzyLikeThisFieldQueryBuilder::new("title")
        .to_json_string()
        .unwrap_err();
    assert!(matches!(err, HalberdError::Config(_)));
    assert!(err.to_string().contains("requires 'likeText'"));
}

#[test]
fn test_fuzzy_like_this_omits_unset_options() {
    let json = FuzzyLikeThisFieldQueryBuilder::new("title")
        .like_text("foo")
        .max_num_terms(5)
        .boost(2.0)
        .to_json_string()
        .unwrap();
    assert_eq!(
        json,
        r#"{"fuzzyLikeThis":{"title":{"likeText":"foo","maxNumTerms":5,"boost":2.0}}}"#
    );
}

#[test]
fn test_builders_compose_as_trait_objects() {
    let queries: Vec<Box<dyn QueryBuilder>> = vec![
        Box::new(FuzzyLikeThisFieldQueryBuilder::new("body").like_text("rust")),
        Box::new(halberd::builder::TermQueryBuilder::new("tag", "search")),
    ];
    let rendered: Vec<_> = queries.iter().map(|q| q.to_json().unwrap()).collect();
    assert_eq!(
        rendered,
        vec![
            json!({"fuzzyLikeThis": {"body": {"likeText": "rust"}}}),
            json!({"term": {"tag": "search"}}),
        ]
    );

    let facet = TermsFacetBuilder::new("langs")
        .field("lang")
        .size(3)
        .facet_filter(TermFilterBuilder::new("tag", "rust"))
        .global(false);
    assert_eq!(facet.name(), "langs");
    assert_eq!(
        facet.to_json().unwrap(),
        json!({
            "langs": {
                "terms": {"field": "lang", "size": 3},
                "facet_filter": {"term": {"tag": "rust"}},
                "global": false
            }
        })
    );
}
