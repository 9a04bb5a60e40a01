//! Tests for contact values.

use crate::contact::domain::{Contact, ContactDetails, ContactDomainError, ContactId};
use rstest::rstest;

fn named(name: &str) -> Contact {
    Contact::new(
        ContactId::new("c1"),
        ContactDetails::new(name, "someone@example.com", None).expect("valid contact"),
    )
}

#[rstest]
#[case("Anna Berg", "AB")]
#[case("anna maria berg", "AB")]
#[case("Cher", "C")]
#[case("  Émile   Zola ", "ÉZ")]
fn initials_use_first_and_last_name(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(named(name).initials(), expected);
}

#[rstest]
fn details_are_trimmed() {
    let details = ContactDetails::new("  Ben Cole ", " ben@example.com ", Some(" 0123 ".to_owned()))
        .expect("valid contact");

    assert_eq!(details.name(), "Ben Cole");
    assert_eq!(details.email(), "ben@example.com");
    assert_eq!(details.phone(), Some("0123"));
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_names_are_rejected(#[case] name: &str) {
    assert_eq!(
        ContactDetails::new(name, "x@example.com", None),
        Err(ContactDomainError::EmptyName)
    );
}
