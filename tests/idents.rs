//! Public identifier derivation.
//!
//! Pure logic; no database involved.

use aegis::app::ident::{derive_public_id, new_public_id, validate_public_id, InternalId};

#[test]
fn derivation_is_deterministic() {
    let id = InternalId::from_hex("0123456789abcdef01234567").unwrap();
    assert_eq!(derive_public_id(&id), derive_public_id(&id));
}

#[test]
fn derived_ids_are_seven_characters() {
    let id = InternalId::from_hex("0123456789abcdef01234567").unwrap();
    assert_eq!(derive_public_id(&id).len(), 7);

    for _ in 0..100 {
        assert_eq!(new_public_id().len(), 7);
    }
}

#[test]
fn derived_ids_validate() {
    let id = InternalId::from_hex("ffeeddccbbaa998877665544").unwrap();
    assert!(validate_public_id(&derive_public_id(&id)));
}

#[test]
fn validation_is_a_length_check_only() {
    assert!(validate_public_id("abc1234"));
    assert!(!validate_public_id(""));
    assert!(!validate_public_id("abc123"));
    assert!(!validate_public_id("abc12345"));
}

#[test]
fn wrong_width_internal_ids_are_rejected() {
    // too short
    assert!(InternalId::from_hex("0123456789abcdef").is_err());
    // too long
    assert!(InternalId::from_hex("0123456789abcdef0123456789").is_err());
    // not hex at all
    assert!(InternalId::from_hex("not-hex-not-hex-not-hex!").is_err());
}

#[test]
fn tail_bytes_drive_the_volatile_segment() {
    let a = InternalId::from_hex("0123456789abcdef01234567").unwrap();
    let b = InternalId::from_hex("0123456789abcdef01aabbcc").unwrap();
    assert_ne!(derive_public_id(&a), derive_public_id(&b));
}

#[test]
fn generated_ids_round_trip_through_hex() {
    let id = InternalId::generate();
    let restored = InternalId::from_hex(&id.to_hex()).unwrap();
    assert_eq!(derive_public_id(&id), derive_public_id(&restored));
}
