//! Tests for `FindOrCreate`.

use super::FindOrCreate;

#[test]
fn created_tag() {
  let r = FindOrCreate::Created(1);
  assert!(r.was_created());
  assert_eq!(*r.get(), 1);
  assert_eq!(r.into_inner(), 1);
}

#[test]
fn found_tag() {
  let r = FindOrCreate::Found("a");
  assert!(!r.was_created());
  assert_eq!(r.into_inner(), "a");
}

#[test]
fn map_keeps_tag() {
  let r = FindOrCreate::Found(2).map(|v| v * 10);
  assert_eq!(r, FindOrCreate::Found(20));
  let r = FindOrCreate::Created(2).map(|v| v.to_string());
  assert_eq!(r, FindOrCreate::Created("2".to_string()));
}
