// ============================================================
// Layer 3 - VqaRecord Domain Type
// ============================================================
// One labelled example from a VQA dataset:
//   image_id: which image the question is about
//   question: the natural language question
//   answer:   the human-provided answer string
//
// The model never looks at the image itself. The id is kept so
// predictions can be traced back to the picture they concern.
//
// Example:
//   { "image_id": 42, "question": "What color is the bus?", "answer": "red" }

use serde::{Deserialize, Serialize};

/// Image identifiers show up both as integers (COCO ids) and as
/// file names depending on how the dataset was exported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageId {
    Number(u64),
    Name(String),
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageId::Number(n) => write!(f, "{n}"),
            ImageId::Name(s)   => f.write_str(s),
        }
    }
}

/// A raw labelled example, before tokenisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqaRecord {
    pub image_id: ImageId,
    pub question: String,
    pub answer:   String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_named_image_ids_deserialize() {
        let a: VqaRecord = serde_json::from_str(
            r#"{"image_id": 42, "question": "What color?", "answer": "red"}"#,
        ).unwrap();
        let b: VqaRecord = serde_json::from_str(
            r#"{"image_id": "COCO_val_0001.jpg", "question": "How many?", "answer": "2"}"#,
        ).unwrap();

        assert_eq!(a.image_id, ImageId::Number(42));
        assert_eq!(b.image_id, ImageId::Name("COCO_val_0001.jpg".to_string()));
        assert_eq!(b.image_id.to_string(), "COCO_val_0001.jpg");
    }
}
