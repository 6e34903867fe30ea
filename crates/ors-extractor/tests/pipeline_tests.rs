//! Owner resolution integration tests
//!
//! Exercises the full pipeline from raw strings and property documents to the
//! serialized owner record.

use chrono::NaiveDate;
use ors_core::{
    AppConfig, Company, GroupKey, OwnerEntity, Person, PropertyOwnership, RawOwnerMention,
    ReasonCode, SaleHistoryRow,
};
use ors_extractor::{
    dedupe, InvalidOwnerCollector, OwnerResolver, PersonNameParser, SegmentOutcome,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn resolve(raw: &str) -> (Vec<OwnerEntity>, InvalidOwnerCollector) {
    let mut collector = InvalidOwnerCollector::new();
    let owners = OwnerResolver::new().resolve_mention(raw, &mut collector);
    (owners, collector)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Mention-level behaviour
// =============================================================================

#[test]
fn test_surname_inheritance_after_comma() {
    let (owners, collector) = resolve("SMITH, JOHN & MARY");

    assert!(collector.is_empty());
    assert_eq!(owners.len(), 2);
    for owner in &owners {
        assert_eq!(owner.as_person().map(|p| p.last_name.as_str()), Some("Smith"));
    }
    assert_eq!(owners[0].as_person().unwrap().first_name, "John");
    assert_eq!(owners[1].as_person().unwrap().first_name, "Mary");
}

#[test]
fn test_company_precedence() {
    let (owners, _) = resolve("ABC PROPERTIES LLC");
    assert_eq!(owners, vec![OwnerEntity::from(Company::new("ABC Properties LLC"))]);

    let (owners, _) = resolve("SMITH & JONES LLC");
    assert_eq!(owners, vec![OwnerEntity::from(Company::new("Smith & Jones LLC"))]);
}

#[test]
fn test_prefix_and_suffix() {
    let (owners, _) = resolve("DR JOHN SMITH JR");
    assert_eq!(
        owners,
        vec![OwnerEntity::from(
            Person::new("John", "Smith").with_prefix("Dr").with_suffix("Jr")
        )]
    );
}

#[test]
fn test_placeholder_entry() {
    let resolver = OwnerResolver::new();
    assert!(resolver.segmenter().segment("*** MULTIPLE OWNERS ***").is_empty());

    let (owners, collector) = resolve("*** MULTIPLE OWNERS ***");
    assert!(owners.is_empty());
    assert_eq!(collector.len(), 1);
    assert_eq!(collector.entries()[0].reason, ReasonCode::PlaceholderEntry);
}

#[test]
fn test_mixed_person_and_company() {
    let (owners, _) = resolve("DOE JANE & FIRST NATIONAL BANK");
    assert_eq!(
        owners,
        vec![
            OwnerEntity::from(Person::new("Jane", "Doe")),
            OwnerEntity::from(Company::new("First National Bank")),
        ]
    );
}

#[test]
fn test_noise_designators() {
    let (owners, _) = resolve("JONES ROBERT & LINDA H/W JTWROS");
    assert_eq!(
        owners,
        vec![
            OwnerEntity::from(Person::new("Robert", "Jones")),
            OwnerEntity::from(Person::new("Linda", "Jones")),
        ]
    );

    let (owners, collector) = resolve("ET AL");
    assert!(owners.is_empty());
    assert_eq!(collector.entries()[0].reason, ReasonCode::EmptyAfterClean);
}

#[test]
fn test_repeated_owner_deduplicated() {
    let (owners, _) = resolve("SMITH JOHN & SMITH JOHN");
    assert_eq!(owners.len(), 1);
}

#[test]
fn test_resolution_reports_every_segment() {
    let resolution = OwnerResolver::new().resolve_segments("MARY & J R & ACME LLC");

    assert_eq!(resolution.outcomes.len(), resolution.segments.len());
    assert_eq!(
        resolution.outcomes[0],
        SegmentOutcome::Invalid(ReasonCode::SingleTokenNoFallback)
    );
    assert_eq!(
        resolution.outcomes[1],
        SegmentOutcome::Invalid(ReasonCode::UnableToClassifyPerson)
    );
    assert!(resolution.outcomes[2].is_owner());
    assert_eq!(resolution.failures().count(), 2);
    assert_eq!(resolution.owners().count(), 1);
}

// =============================================================================
// Property-level behaviour
// =============================================================================

#[test]
fn test_chronological_group_order() {
    let mentions = vec![
        RawOwnerMention::current("DOE JANE"),
        RawOwnerMention::dated("ROE RICHARD", date(2021, 2, 10)),
        RawOwnerMention::dated("POE ANNA", date(2019, 5, 1)),
    ];
    let record = OwnerResolver::new().resolve_property(&mentions);

    assert_eq!(record.keys(), vec!["2019-05-01", "2021-02-10", "current"]);
}

#[test]
fn test_grantor_not_relisted() {
    let document = PropertyOwnership {
        current_owners: Some("SMITH JOHN & MARY".to_string()),
        sales: vec![
            SaleHistoryRow {
                date: Some("5/1/2019".to_string()),
                grantee: Some("SMITH JOHN & MARY".to_string()),
                grantor: Some("DOE JANE".to_string()),
            },
            SaleHistoryRow {
                date: Some("3/15/2010".to_string()),
                grantee: Some("DOE JANE".to_string()),
                grantor: Some("ACME HOMES INC".to_string()),
            },
        ],
    };

    let record = OwnerResolver::new().resolve_document(document);
    assert_eq!(
        record.keys(),
        vec!["2010-03-15", "2019-05-01", "unknown_date_1", "current"]
    );
    assert_eq!(
        record.group(&GroupKey::Unknown(1)),
        Some(&[OwnerEntity::from(Company::new("Acme Homes Inc"))][..])
    );
}

#[test]
fn test_current_group_defaults_to_empty() {
    let mentions = vec![RawOwnerMention::current("N/A")];
    let record = OwnerResolver::new().resolve_property(&mentions);

    assert_eq!(record.keys(), vec!["current"]);
    assert_eq!(record.group(&GroupKey::Current), Some(&[][..]));
    assert_eq!(record.invalid_owners.len(), 1);
}

#[test]
fn test_record_json_shape() {
    let mentions = vec![
        RawOwnerMention::current("SMITH JOHN R"),
        RawOwnerMention::dated("ABC PROPERTIES LLC", date(2019, 5, 1)),
        RawOwnerMention::current("UNKNOWN"),
    ];
    let record = OwnerResolver::new().resolve_property(&mentions);

    let value: Value = serde_json::from_str(&record.to_json(false, false).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "owners_by_date": {
                "2019-05-01": [{"type": "company", "name": "ABC Properties LLC"}],
                "current": [{
                    "type": "person",
                    "first_name": "John",
                    "middle_name": "R",
                    "last_name": "Smith"
                }]
            },
            "invalid_owners": [{"raw": "UNKNOWN", "reason": "placeholder_entry"}]
        })
    );

    let value: Value = serde_json::from_str(&record.to_json(true, false).unwrap()).unwrap();
    assert_eq!(value["owners_by_date"]["current"][0]["prefix_name"], Value::Null);
    assert_eq!(value["owners_by_date"]["current"][0]["suffix_name"], Value::Null);
}

#[test]
fn test_config_disables_share_annotation() {
    let mut config = AppConfig::default();
    config.classifier.share_annotation_as_company = false;
    let resolver = OwnerResolver::with_config(&config);

    let mut collector = InvalidOwnerCollector::new();
    let owners = resolver.resolve_mention("SMITH JOHN (UND INT)", &mut collector);
    assert_eq!(owners[0].kind(), ors_core::OwnerKind::Person);
}

#[test]
fn test_pipeline_rerun_is_identical() {
    let mentions = vec![
        RawOwnerMention::current("SMITH JOHN R & JANE M"),
        RawOwnerMention::dated("VAN DYKE, PETER & ABC TRUST", date(2001, 7, 4)),
        RawOwnerMention::prior_unmatched("C/O FIRST NATIONAL BANK"),
    ];
    let resolver = OwnerResolver::new();

    let first = resolver.resolve_property(&mentions).to_json(false, true).unwrap();
    let second = resolver.resolve_property(&mentions).to_json(false, true).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Properties
// =============================================================================

fn raw_owner_string() -> impl Strategy<Value = String> {
    let fixed = prop::sample::select(vec![
        "SMITH", "JOHN", "MARY", "J", "DR", "JR", "LLC", "TRUSTEE", "ET AL", "&", "AND", ",",
        "/", "VAN", "N/A",
    ])
    .prop_map(|w| w.to_string());
    let word = prop_oneof![fixed, "[A-Z]{1,8}", "[a-z0-9&/,.'%()-]{1,6}"];
    prop::collection::vec(word, 0..8).prop_map(|words| words.join(" "))
}

fn entity() -> impl Strategy<Value = OwnerEntity> {
    prop_oneof![
        ("[A-Z][a-z]{0,5}", "[A-Z][a-z]{0,5}")
            .prop_map(|(first, last)| OwnerEntity::from(Person::new(first, last))),
        "[A-Z]{1,4} LLC".prop_map(|name| OwnerEntity::from(Company::new(name))),
    ]
}

proptest! {
    #[test]
    fn prop_every_segment_has_one_outcome(raw in raw_owner_string()) {
        let resolution = OwnerResolver::new().resolve_segments(&raw);

        prop_assert_eq!(resolution.outcomes.len(), resolution.segments.len());
        for outcome in &resolution.outcomes {
            if let SegmentOutcome::Owner(entity) = outcome {
                prop_assert!(entity.is_valid());
            }
        }
        if resolution.segments.is_empty() && !raw.trim().is_empty() {
            prop_assert!(resolution.rejected.is_some());
        }
    }

    #[test]
    fn prop_resolution_is_deterministic(raw in raw_owner_string()) {
        let resolver = OwnerResolver::new();
        prop_assert_eq!(resolver.resolve_segments(&raw), resolver.resolve_segments(&raw));
    }

    #[test]
    fn prop_parse_person_is_pure(raw in "[A-Z]{1,6}( [A-Z]{1,6}){0,3}") {
        let parser = PersonNameParser::default();
        let segment = ors_extractor::NameSegment::new(raw);
        prop_assert_eq!(
            parser.parse_person(&segment, Some("Smith")),
            parser.parse_person(&segment, Some("Smith"))
        );
    }

    #[test]
    fn prop_dedupe_of_doubled_list(list in prop::collection::vec(entity(), 0..10)) {
        let doubled: Vec<OwnerEntity> = list.iter().chain(list.iter()).cloned().collect();
        prop_assert_eq!(dedupe(doubled), dedupe(list));
    }
}
