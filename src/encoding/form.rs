//! `application/x-www-form-urlencoded` body serialization.

use super::params::FormData;
use super::percent::{PercentCodec, is_blank};
use super::query::encode_pairs;

/// Serializes form data to `k=v&k=v`.
///
/// Keys are sorted case-insensitively so the same data always yields the same
/// body. Blank keys are dropped; null values are emitted as `key=`.
#[must_use]
pub fn encode_form(form: &FormData, codec: &PercentCodec) -> String {
    form.sorted()
        .into_iter()
        .filter(|(key, _)| !is_blank(key))
        .flat_map(|(key, value)| encode_pairs(key.trim(), value, codec))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ParamValue;

    #[test]
    fn test_encode_form_sorts_keys_case_insensitively() {
        let form = FormData::new().with("b", "2").with("A", "1");
        assert_eq!(encode_form(&form, &PercentCodec::default()), "A=1&b=2");
    }

    #[test]
    fn test_encode_form_is_stable_across_insertion_orders() {
        let first = FormData::new().with("zeta", "z").with("Alpha", "a").with("mid", "m");
        let second = FormData::new().with("mid", "m").with("zeta", "z").with("Alpha", "a");
        let codec = PercentCodec::default();
        assert_eq!(encode_form(&first, &codec), encode_form(&second, &codec));
        assert_eq!(encode_form(&first, &codec), "Alpha=a&mid=m&zeta=z");
    }

    #[test]
    fn test_encode_form_percent_encodes_values() {
        let form = FormData::new().with("msg", "hi there & bye").with("名", "值");
        assert_eq!(
            encode_form(&form, &PercentCodec::default()),
            "msg=hi%20there%20%26%20bye&%E5%90%8D=%E5%80%BC"
        );
    }

    #[test]
    fn test_encode_form_null_and_list_values() {
        let form = FormData::new()
            .with("tags", vec!["a", "b"])
            .with("empty", ParamValue::Null);
        assert_eq!(
            encode_form(&form, &PercentCodec::default()),
            "empty=&tags=a&tags=b"
        );
    }

    #[test]
    fn test_encode_form_empty_is_empty_string() {
        assert_eq!(encode_form(&FormData::new(), &PercentCodec::default()), "");
    }
}
