//! Already-parsed inference responses.
//!
//! The decoder only needs the accessors in `InferOutput` and
//! `InferResponse`; any transport-specific response type can implement them.
//! `ModelInferResponse` is an owned implementation used by the CLI and tests,
//! and doubles as the JSON dump format.

use serde::{Deserialize, Serialize};

/// Descriptor of one output tensor.
pub trait InferOutput {
    fn name(&self) -> &str;
    fn datatype(&self) -> &str;
    fn shape(&self) -> &[i64];
}

/// Response carrying output descriptors and their raw payloads.
///
/// `raw_output_contents()[i]` is the payload of `outputs()[i]`; the pairing
/// is positional and is never resolved by name.
pub trait InferResponse {
    type Output: InferOutput;

    fn outputs(&self) -> &[Self::Output];
    fn raw_output_contents(&self) -> &[Vec<u8>];
}

/// Owned output descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTensor {
    pub name: String,
    pub datatype: String,
    pub shape: Vec<i64>,
}

impl OutputTensor {
    pub fn new(name: impl Into<String>, datatype: impl Into<String>, shape: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            datatype: datatype.into(),
            shape,
        }
    }
}

impl InferOutput for OutputTensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn datatype(&self) -> &str {
        &self.datatype
    }

    fn shape(&self) -> &[i64] {
        &self.shape
    }
}

/// Owned inference response.
///
/// # Examples
/// ```
/// use tensorbind_core::{InferResponse, ModelInferResponse};
///
/// let mut response = ModelInferResponse::new("classifier");
/// response.push_output("score", "FLOAT32", vec![1], 1.0f32.to_le_bytes().to_vec());
/// assert_eq!(response.outputs().len(), 1);
/// assert_eq!(response.raw_output_contents()[0], vec![0x00, 0x00, 0x80, 0x3f]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInferResponse {
    #[serde(default)]
    pub model_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub outputs: Vec<OutputTensor>,
    #[serde(default)]
    pub raw_output_contents: Vec<Vec<u8>>,
}

impl ModelInferResponse {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    /// Append an output and its payload at the same position.
    pub fn push_output(
        &mut self,
        name: impl Into<String>,
        datatype: impl Into<String>,
        shape: Vec<i64>,
        raw: Vec<u8>,
    ) -> &mut Self {
        self.outputs.push(OutputTensor::new(name, datatype, shape));
        self.raw_output_contents.push(raw);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl InferResponse for ModelInferResponse {
    type Output = OutputTensor;

    fn outputs(&self) -> &[OutputTensor] {
        &self.outputs
    }

    fn raw_output_contents(&self) -> &[Vec<u8>] {
        &self.raw_output_contents
    }
}
