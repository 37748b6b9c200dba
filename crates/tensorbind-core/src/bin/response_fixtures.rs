use std::fs;
use std::path::{Path, PathBuf};

use tensorbind_core::{ModelInferResponse, encode_string_payload};

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_case(&root.join("classification"), classification())?;
    write_case(&root.join("detection_2d"), detection_2d())?;
    write_case(&root.join("empty_strings"), empty_strings())?;
    write_case(&root.join("mixed_ints"), mixed_ints())?;
    Ok(())
}

struct CaseSpec {
    response: ModelInferResponse,
    fields: Vec<&'static str>,
}

fn classification() -> CaseSpec {
    let mut response = ModelInferResponse::new("classifier");
    response
        .push_output("scores", "FLOAT32", vec![1, 3], le_bytes(&[0.5f32, 0.25, 1.0]))
        .push_output(
            "labels",
            "STRING",
            vec![1, 3],
            encode_string_payload(["cat", "", "dog"]),
        )
        .push_output("top", "INT64", vec![1], 2i64.to_le_bytes().to_vec())
        .push_output("debug", "UINT8", vec![1, 2], vec![1, 2]);
    CaseSpec {
        response,
        fields: vec!["scores=Vec<f32>", "labels=Vec<String>", "top=i64"],
    }
}

fn detection_2d() -> CaseSpec {
    let mut response = ModelInferResponse::new("detector");
    response
        .push_output(
            "boxes",
            "FLOAT32",
            vec![2, 2],
            le_bytes(&[1.5f32, -2.0, 0.0, 4.0]),
        )
        .push_output("classes", "INT32", vec![2, 1], le_bytes(&[7i32, 9]))
        .push_output("mask", "BOOL", vec![1, 3], vec![1, 0, 1])
        .push_output(
            "names",
            "STRING",
            vec![2, 2],
            encode_string_payload(["a", "b", "c", "d"]),
        );
    CaseSpec {
        response,
        fields: vec![
            "boxes=Vec<Vec<f32>>",
            "classes=Vec<Vec<i32>>",
            "mask=Vec<bool>",
            "names=Vec<Vec<String>>",
        ],
    }
}

fn empty_strings() -> CaseSpec {
    let mut response = ModelInferResponse::new("tokenizer");
    response
        .push_output("text", "STRING", vec![1], Vec::new())
        .push_output("tokens", "STRING", vec![1, 4], Vec::new())
        .push_output("table", "STRING", vec![3, 2], Vec::new());
    CaseSpec {
        response,
        fields: vec![
            "text=String",
            "tokens=Vec<String>",
            "table=Vec<Vec<String>>",
            "absent=u8",
        ],
    }
}

fn mixed_ints() -> CaseSpec {
    let mut response = ModelInferResponse::new("mixed");
    response
        .push_output("bytes", "UINT8", vec![1, 2], vec![255, 0])
        .push_output("port", "UINT16", vec![1], 513u16.to_le_bytes().to_vec())
        .push_output("mask", "UINT32", vec![1], u32::MAX.to_le_bytes().to_vec())
        .push_output("deltas", "INT8", vec![1, 2], le_bytes(&[-1i8, 127]))
        .push_output("offset", "INT16", vec![1], (-2i16).to_le_bytes().to_vec())
        .push_output("ratio", "FLOAT64", vec![1], 0.5f64.to_le_bytes().to_vec());
    CaseSpec {
        response,
        fields: vec![
            "bytes=Vec<u8>",
            "port=u16",
            "mask=u32",
            "deltas=Vec<i8>",
            "offset=i16",
            "ratio=f64",
        ],
    }
}

trait ToLe {
    fn to_le(&self) -> Vec<u8>;
}

macro_rules! impl_to_le {
    ($($ty:ty),*) => {
        $(
            impl ToLe for $ty {
                fn to_le(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }
            }
        )*
    };
}

impl_to_le!(i8, i32, f32);

fn le_bytes<T: ToLe>(values: &[T]) -> Vec<u8> {
    values.iter().flat_map(ToLe::to_le).collect()
}

fn write_case(dir: &Path, spec: CaseSpec) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;

    let response = serde_json::to_string(&spec.response)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    let fields = serde_json::to_string(&spec.fields)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;

    let response_path = dir.join("response.json");
    fs::write(&response_path, response)
        .map_err(|err| format!("failed to write {}: {}", response_path.display(), err))?;
    let fields_path = dir.join("fields.json");
    fs::write(&fields_path, fields)
        .map_err(|err| format!("failed to write {}: {}", fields_path.display(), err))?;
    Ok(())
}
