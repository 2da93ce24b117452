//! End-to-end selection sessions over JSON documents.

use sift_core::{Candidate, DescriptorSet, Error, PropertyDescriptor, Session, TreeAccess};
use sift_page::Page;
use sift_query::QueryError;

const CLASS_ITEM: &str = "contains(concat(' ', normalize-space(@class), ' '), ' item ')";

const LIST: &str = r#"{
  "tag": "html",
  "children": [
    {"tag": "body", "children": [
      {"tag": "ul", "attributes": {"id": "menu"}, "children": [
        {"tag": "li", "attributes": {"class": "item active"}, "children": ["One"]},
        {"tag": "li", "attributes": {"class": "item"}, "children": ["Two"]},
        {"tag": "li", "attributes": {"class": "other"}, "children": ["Three"]}
      ]},
      {"tag": "p", "children": ["Aside"]}
    ]}
  ]
}"#;

fn list() -> Page {
    Page::from_json(LIST).unwrap()
}

fn strings(candidates: &[Candidate]) -> Vec<String> {
    candidates.iter().map(ToString::to_string).collect()
}

// ========== synthesis ==========

#[test]
fn test_unique_id_stops_after_two_candidates() {
    let page = Page::from_json(
        r#"{"tag": "html", "children": [{"tag": "body", "children": [
              {"tag": "div", "attributes": {"id": "x"}},
              {"tag": "div"}
           ]}]}"#,
    )
    .unwrap();
    let target = page.point("//div[@id='x']").unwrap().unwrap();
    let session = Session::with_defaults(&page);
    let synthesis = session.synthesize(target).unwrap();
    assert!(synthesis.guaranteed_unique);
    assert_eq!(
        strings(&synthesis.candidates),
        vec!["//div", "//div[@id='x']"]
    );
}

#[test]
fn test_class_disambiguates_siblings() {
    let page = list();
    let session = Session::with_defaults(&page);
    let third = page.point("//li[3]").unwrap().unwrap();
    let synthesis = session.synthesize(third).unwrap();
    assert_eq!(
        synthesis.most_specific().unwrap().as_str(),
        "//li[@class='other']"
    );
    assert_eq!(page.point("//li[@class='other']").unwrap(), Some(third));
}

#[test]
fn test_document_element_has_no_position() {
    let page = list();
    let html = page.document_element().unwrap();
    assert_eq!(page.same_tag_position(html), None);
    assert_eq!(page.parent(html), None);
    let session = Session::with_defaults(&page);
    let synthesis = session.synthesize(html).unwrap();
    assert_eq!(strings(&synthesis.candidates), vec!["//html"]);
    assert!(synthesis.guaranteed_unique);
}

#[test]
fn test_text_descriptor() {
    let page = list();
    let descriptors = DescriptorSet::new(vec![
        PropertyDescriptor::tag_name(),
        PropertyDescriptor::inner_text(),
    ])
    .unwrap();
    let session = Session::new(&page, descriptors);
    let two = page.point("//li[2]").unwrap().unwrap();
    let synthesis = session.synthesize(two).unwrap();
    assert_eq!(
        strings(&synthesis.candidates),
        vec!["//*", "//li", "//*[text()='Two']"]
    );
}

#[test]
fn test_synthesis_is_repeatable() {
    let page = list();
    let session = Session::with_defaults(&page);
    let node = page.point("//p").unwrap().unwrap();
    assert_eq!(
        session.synthesize(node).unwrap(),
        session.synthesize(node).unwrap()
    );
}

#[test]
fn test_quote_in_value_fails_evaluation() {
    let page = Page::from_json(
        r#"{"tag": "html", "children": [{"tag": "a", "attributes": {"title": "it's"}}]}"#,
    )
    .unwrap();
    let link = page.point("//a").unwrap().unwrap();
    let descriptors =
        DescriptorSet::new(vec![PropertyDescriptor::attribute("title").locked()]).unwrap();
    let session = Session::new(&page, descriptors);
    assert!(matches!(
        session.synthesize(link),
        Err(QueryError::UnexpectedToken { .. } | QueryError::UnterminatedLiteral { .. })
    ));
}

// ========== generalization ==========

#[test]
fn test_class_lists_relax_to_shared_token() {
    let page = list();
    let mut session = Session::with_defaults(&page);
    let one = page.point("//li[1]").unwrap().unwrap();
    let two = page.point("//li[2]").unwrap().unwrap();

    let first = session.record(one).unwrap();
    assert_eq!(first.resolved_node(), one);
    assert_eq!(
        first.candidates().last().unwrap().as_str(),
        "//li[@class='item active']"
    );
    let _ = session.record(two).unwrap();
    assert!(session.is_generalizable());

    let general = session.current_general_selector().unwrap().unwrap();
    assert_eq!(general.selector, format!("//li[{CLASS_ITEM}]"));
    assert_eq!(general.record_index, 0);
    assert_eq!(general.candidate_index, 1);
    assert_eq!(general.match_count, 2);
    assert_eq!(session.matches(&general.selector).unwrap(), vec![one, two]);
}

#[test]
fn test_empty_store_signals_error() {
    let page = list();
    let session = Session::with_defaults(&page);
    assert!(matches!(
        session.current_general_selector(),
        Err(Error::EmptySelectionStore)
    ));
}

#[test]
fn test_single_record_returns_own_candidate() {
    let page = list();
    let mut session = Session::with_defaults(&page);
    let one = page.point("//li[1]").unwrap().unwrap();
    let _ = session.record(one).unwrap();
    assert!(!session.is_generalizable());

    let own: Vec<String> = strings(session.store().records()[0].candidates());
    let general = session.current_general_selector().unwrap().unwrap();
    assert_eq!(general.selector, "//li[@class='item active']");
    assert!(own.contains(&general.selector));
    assert_eq!(general.match_count, 1);
    assert_eq!(general.record_index, 0);
}

#[test]
fn test_disjoint_targets_have_no_common_selector() {
    let page = Page::from_json(
        r#"{"tag": "html", "children": [{"tag": "body", "children": [
              {"tag": "section", "children": [{"tag": "span", "children": ["a"]}]},
              {"tag": "aside", "children": [{"tag": "a", "children": ["b"]}]}
           ]}]}"#,
    )
    .unwrap();
    let mut session = Session::with_defaults(&page);
    let _ = session.record(page.point("//span").unwrap().unwrap()).unwrap();
    let _ = session.record(page.point("//a").unwrap().unwrap()).unwrap();
    assert_eq!(session.current_general_selector().unwrap(), None);
}

#[test]
fn test_unshared_classes_fall_back_to_tag() {
    let page = list();
    let mut session = Session::with_defaults(&page);
    let _ = session.record(page.point("//li[2]").unwrap().unwrap()).unwrap();
    let _ = session.record(page.point("//li[3]").unwrap().unwrap()).unwrap();
    let general = session.current_general_selector().unwrap().unwrap();
    assert_eq!(general.selector, "//li");
    assert_eq!(general.match_count, 3);
}

#[test]
fn test_clear_resets_store() {
    let page = list();
    let mut session = Session::with_defaults(&page);
    let _ = session.record(page.point("//p").unwrap().unwrap()).unwrap();
    session.clear();
    assert!(session.store().is_empty());
    assert!(matches!(
        session.current_general_selector(),
        Err(Error::EmptySelectionStore)
    ));
}

// ========== host ==========

#[test]
fn test_matches_propagates_query_errors() {
    let page = list();
    let session = Session::with_defaults(&page);
    assert!(matches!(session.matches("//li["), Err(Error::Query(_))));
    assert!(matches!(session.matches("li"), Err(Error::Query(QueryError::RelativePath))));
}

#[test]
fn test_point_takes_first_match() {
    let page = list();
    let first = page.point("//li").unwrap().unwrap();
    assert_eq!(page.text_content(first), "One");
    assert_eq!(page.point("//table").unwrap(), None);
}

#[test]
fn test_class_attribute_is_class_name() {
    let page = list();
    let one = page.point("//li").unwrap().unwrap();
    assert_eq!(page.attribute(one, "class").as_deref(), Some("item active"));
    assert_eq!(page.attribute(one, "id"), None);
}

#[test]
fn test_load_missing_file() {
    let err = Page::load("/nonexistent/sift/page.json").unwrap_err();
    assert!(err.to_string().contains("page.json"));
}
