//! Cache Key Module
//!
//! Derives fixed-length cache keys from ordered argument lists.
//!
//! Every operand is rendered to text, the texts are joined in call order, and
//! the SHA-1 digest of the result is returned as 40 lowercase hex characters.
//! The rendering rules follow the classic "print operands" convention so keys
//! stay compatible with existing caches:
//!
//! - integers and booleans print their natural text form, strings print raw
//! - floats print shortest round-trip digits, switching to `1e+06` style
//!   outside `1e-4..1e6`; infinities print as `+Inf`/`-Inf`
//! - sequences print as `[a b c]`, maps as `map[k:v k:v]` ordered by key
//! - `None` prints as `<nil>`
//! - adjacent top-level operands get a space only when neither is a string

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use sha1::{Digest, Sha1};

// == Key Part ==
/// A value that can take part in a cache key.
pub trait KeyPart {
    /// Appends the textual form of the value to `out`.
    fn write_key_part(&self, out: &mut String);

    /// True for text operands, which are never space-separated from neighbours.
    fn is_text(&self) -> bool {
        false
    }
}

impl<T: KeyPart + ?Sized> KeyPart for &T {
    fn write_key_part(&self, out: &mut String) {
        (**self).write_key_part(out)
    }

    fn is_text(&self) -> bool {
        (**self).is_text()
    }
}

macro_rules! display_key_part {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyPart for $ty {
                fn write_key_part(&self, out: &mut String) {
                    let _ = write!(out, "{}", self);
                }
            }
        )*
    };
}

display_key_part!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool);

macro_rules! float_key_part {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyPart for $ty {
                fn write_key_part(&self, out: &mut String) {
                    if self.is_infinite() {
                        out.push_str(if self.is_sign_positive() { "+Inf" } else { "-Inf" });
                    } else if self.is_nan() {
                        out.push_str("NaN");
                    } else {
                        write_float(&format!("{:e}", self), &format!("{}", self), out);
                    }
                }
            }
        )*
    };
}

float_key_part!(f32, f64);

/// Picks between the plain and exponent forms of a finite float.
///
/// `scientific` is the shortest `{:e}` rendering, e.g. `1.5e-7`.
fn write_float(scientific: &str, plain: &str, out: &mut String) {
    let (mantissa, exp) = scientific.split_once('e').unwrap_or((scientific, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..6).contains(&exp) {
        out.push_str(plain);
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        let _ = write!(out, "{}e{}{:02}", mantissa, sign, exp.unsigned_abs());
    }
}

impl KeyPart for str {
    fn write_key_part(&self, out: &mut String) {
        out.push_str(self);
    }

    fn is_text(&self) -> bool {
        true
    }
}

impl KeyPart for String {
    fn write_key_part(&self, out: &mut String) {
        out.push_str(self);
    }

    fn is_text(&self) -> bool {
        true
    }
}

impl KeyPart for char {
    fn write_key_part(&self, out: &mut String) {
        out.push(*self);
    }

    fn is_text(&self) -> bool {
        true
    }
}

impl<T: KeyPart> KeyPart for Option<T> {
    fn write_key_part(&self, out: &mut String) {
        match self {
            Some(inner) => inner.write_key_part(out),
            None => out.push_str("<nil>"),
        }
    }

    fn is_text(&self) -> bool {
        self.as_ref().is_some_and(|inner| inner.is_text())
    }
}

impl<T: KeyPart> KeyPart for [T] {
    fn write_key_part(&self, out: &mut String) {
        out.push('[');
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            item.write_key_part(out);
        }
        out.push(']');
    }
}

impl<T: KeyPart, const N: usize> KeyPart for [T; N] {
    fn write_key_part(&self, out: &mut String) {
        self.as_slice().write_key_part(out)
    }
}

impl<T: KeyPart> KeyPart for Vec<T> {
    fn write_key_part(&self, out: &mut String) {
        self.as_slice().write_key_part(out)
    }
}

impl<K: KeyPart, V: KeyPart> KeyPart for BTreeMap<K, V> {
    fn write_key_part(&self, out: &mut String) {
        write_map(self.iter(), out)
    }
}

impl<K: KeyPart + Ord, V: KeyPart, S> KeyPart for HashMap<K, V, S> {
    fn write_key_part(&self, out: &mut String) {
        let mut pairs: Vec<(&K, &V)> = self.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        write_map(pairs.into_iter(), out)
    }
}

impl KeyPart for serde_json::Value {
    fn write_key_part(&self, out: &mut String) {
        match self {
            serde_json::Value::String(s) => out.push_str(s),
            other => {
                let _ = write!(out, "{}", other);
            }
        }
    }

    fn is_text(&self) -> bool {
        self.is_string()
    }
}

fn write_map<'a, K, V, I>(pairs: I, out: &mut String)
where
    K: KeyPart + 'a,
    V: KeyPart + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    out.push_str("map[");
    for (i, (k, v)) in pairs.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        k.write_key_part(out);
        out.push(':');
        v.write_key_part(out);
    }
    out.push(']');
}

// == Key Generation ==
/// Renders the operands into the text that gets hashed.
pub fn key_text(parts: &[&dyn KeyPart]) -> String {
    let mut text = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 && !part.is_text() && !parts[i - 1].is_text() {
            text.push(' ');
        }
        part.write_key_part(&mut text);
    }
    text
}

/// Generates a 40-character lowercase hex key from an ordered list of values.
///
/// Order matters: the same values in a different order give a different key.
pub fn generate_key(parts: &[&dyn KeyPart]) -> String {
    let digest = Sha1::digest(key_text(parts).as_bytes());
    hex::encode(digest)
}

/// Builds a cache key from any number of [`KeyPart`] values.
///
/// ```
/// use ring_cache::cache_key;
///
/// let key = cache_key!("user", 42_u64);
/// assert_eq!(key.len(), 40);
/// ```
#[macro_export]
macro_rules! cache_key {
    ($($part:expr),+ $(,)?) => {
        $crate::cache::generate_key(&[$(&$part as &dyn $crate::cache::KeyPart),+])
    };
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_vector_strings() {
        let parts = vec!["k1", "k2", "k3"];
        assert_eq!(
            generate_key(&[&parts]),
            "eb98f46aca624b1e402947677c54d025dc463a67"
        );
    }

    #[test]
    fn test_key_vector_integers() {
        let parts: Vec<i64> = vec![1, 2, 3];
        assert_eq!(
            generate_key(&[&parts]),
            "6d780b01458b623aa5f77db71ac9a02ff1d5ecda"
        );
    }

    #[test]
    fn test_key_vector_mixed() {
        let parts = vec![json!(1), json!("k2"), json!(3)];
        assert_eq!(
            generate_key(&[&parts]),
            "ebdf5f5fd2817d5534d668548298bd135ae3dd0e"
        );
    }

    #[test]
    fn test_key_vector_mixed_with_map() {
        let map = BTreeMap::from([(1, "a")]);
        let parts: [&dyn KeyPart; 4] = [&1, &"k2", &3, &map];
        let text = key_text(&[&parts.as_slice()]);
        assert_eq!(text, "[1 k2 3 map[1:a]]");
        assert_eq!(
            generate_key(&[&parts.as_slice()]),
            "60b428a15bf1e9eca224ef24e37c38ec8d8f86f9"
        );
    }

    #[test]
    fn test_top_level_spacing() {
        assert_eq!(key_text(&[&"test", &1]), "test1");
        assert_eq!(key_text(&[&1, &2]), "1 2");
        assert_eq!(key_text(&[&"a", &"b"]), "ab");
        assert_eq!(key_text(&[&1, &"b", &2]), "1b2");
    }

    #[test]
    fn test_key_shape() {
        let key = generate_key(&[&"anything"]);
        assert_eq!(key.len(), 40);
        assert!(key
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_key_is_order_sensitive() {
        let forward = generate_key(&[&vec!["k1", "k2", "k3"]]);
        let reverse = generate_key(&[&vec!["k3", "k2", "k1"]]);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(key_text(&[&65.5_f64]), "65.5");
        assert_eq!(key_text(&[&123_456.0_f64]), "123456");
        assert_eq!(key_text(&[&0.0001_f64]), "0.0001");
        assert_eq!(key_text(&[&-0.0_f64]), "-0");
        assert_eq!(key_text(&[&1e6_f64]), "1e+06");
        assert_eq!(key_text(&[&1_234_567.0_f64]), "1.234567e+06");
        assert_eq!(key_text(&[&0.00001_f64]), "1e-05");
        assert_eq!(key_text(&[&-1.5e-7_f64]), "-1.5e-07");
        assert_eq!(key_text(&[&1e100_f64]), "1e+100");
        assert_eq!(key_text(&[&1.1_f32]), "1.1");
        assert_eq!(key_text(&[&f64::INFINITY, &f64::NEG_INFINITY]), "+Inf -Inf");
        assert_eq!(key_text(&[&f64::NAN]), "NaN");
    }

    #[test]
    fn test_float_key_vector() {
        let parts = vec![1e6_f64, 2.5];
        assert_eq!(key_text(&[&parts]), "[1e+06 2.5]");
        assert_eq!(
            generate_key(&[&parts]),
            "6375ea4a1c19de8c44e0cd5b6193ea17fdfea8ec"
        );
    }

    #[test]
    fn test_hash_map_renders_sorted() {
        let map = HashMap::from([(3, "c"), (1, "a"), (2, "b")]);
        assert_eq!(key_text(&[&map]), "map[1:a 2:b 3:c]");
    }

    #[test]
    fn test_option_rendering() {
        let none: Option<i32> = None;
        assert_eq!(key_text(&[&none]), "<nil>");
        assert_eq!(key_text(&[&Some("x"), &Some(1)]), "x1");
    }

    #[test]
    fn test_macro_matches_function() {
        assert_eq!(cache_key!("test", 1), generate_key(&[&"test", &1]));
        assert_eq!(cache_key!("k", 0_usize), generate_key(&[&"k0"]));
    }
}
