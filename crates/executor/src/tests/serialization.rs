//! Command/outcome serialization round-trips.
//!
//! The command surface is the cross-language interface; these tests pin its
//! JSON shape.

use syncstore_core::{CallerIdentity, Document, Record};
use syncstore_engine::TableId;

use crate::{Command, Error, Outcome};

#[test]
fn command_json_round_trip() {
    let cmd = Command::Add {
        table: TableId::Contact,
        record: Record::new("abc", Document::new("<root/>")),
    };
    let json = serde_json::to_string(&cmd).unwrap();
    let back: Command = serde_json::from_str(&json).unwrap();
    assert_eq!(cmd, back);
}

#[test]
fn command_rejects_unknown_fields() {
    let json = r#"{"Delete": {"table": "Contact", "guid": "abc", "extra": 1}}"#;
    assert!(serde_json::from_str::<Command>(json).is_err());
}

#[test]
fn listing_outcome_serializes_pairs_in_order() {
    let outcome = Outcome::Listing(vec![
        ("g1".to_string(), "1".to_string()),
        ("g2".to_string(), "1".to_string()),
    ]);
    let json = serde_json::to_string(&outcome).unwrap();
    assert_eq!(json, r#"{"Listing":[["g1","1"],["g2","1"]]}"#);
}

#[test]
fn document_outcome_is_transparent_text() {
    let outcome = Outcome::Document(Some(Document::new("<root/>")));
    let json = serde_json::to_string(&outcome).unwrap();
    assert_eq!(json, r#"{"Document":"<root/>"}"#);
}

#[test]
fn error_json_round_trip() {
    let err = Error::IdentityUnresolved {
        user: "someone".into(),
    };
    let json = serde_json::to_string(&err).unwrap();
    let back: Error = serde_json::from_str(&json).unwrap();
    assert_eq!(err, back);
}

#[test]
fn caller_identity_round_trip() {
    for caller in [
        CallerIdentity::System,
        CallerIdentity::User(11),
        CallerIdentity::Unresolved {
            user: "someone".into(),
        },
    ] {
        let json = serde_json::to_string(&caller).unwrap();
        let back: CallerIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(caller, back);
    }
}
