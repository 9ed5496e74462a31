// src/schema/normalize.rs

use serde_json::Value;

/// Sections the schema allows to be absent.
pub const OPTIONAL_SECTIONS: [&str; 3] = ["balans_lasten", "balans_baten", "balans_standen"];

/// Insert every missing optional section under `data` as an empty array.
///
/// Run only on a dataset that passed schema validation. Idempotent; a dataset
/// without an object-valued `data` member comes back untouched.
pub fn normalize(mut dataset: Value) -> Value {
    if let Some(data) = dataset.get_mut("data").and_then(Value::as_object_mut) {
        for section in OPTIONAL_SECTIONS {
            data.entry(section)
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_sections(present: &[&str]) -> Value {
        let mut data = serde_json::Map::new();
        data.insert("lasten".into(), json!([]));
        data.insert("baten".into(), json!([]));
        for s in present {
            data.insert((*s).into(), json!([{"balanscode": "A1", "bedrag": 1}]));
        }
        json!({"metadata": {}, "data": data})
    }

    #[test]
    fn fills_every_missing_combination() {
        for mask in 0u8..8 {
            let present: Vec<&str> = OPTIONAL_SECTIONS
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, s)| *s)
                .collect();
            let out = normalize(with_sections(&present));
            for section in OPTIONAL_SECTIONS {
                let v = &out["data"][section];
                if present.contains(&section) {
                    assert_eq!(v, &json!([{"balanscode": "A1", "bedrag": 1}]));
                } else {
                    assert_eq!(v, &json!([]));
                }
            }
        }
    }

    #[test]
    fn is_idempotent() {
        let once = normalize(with_sections(&["balans_baten"]));
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn leaves_other_sections_alone() {
        let out = normalize(json!({"data": {"lasten": [1], "baten": [2]}}));
        assert_eq!(out["data"]["lasten"], json!([1]));
        assert_eq!(out["data"]["baten"], json!([2]));
    }

    #[test]
    fn non_object_data_is_untouched() {
        let ds = json!({"data": []});
        assert_eq!(normalize(ds.clone()), ds);
    }
}
