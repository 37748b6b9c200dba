use tensorbind_core::{
    DecodeError, InferOutput, InferResponse, ModelInferResponse, decode, encode_string_payload,
    tensor_record,
};

fn le<T: Copy, const N: usize>(values: &[T], to_le: fn(T) -> [u8; N]) -> Vec<u8> {
    values.iter().flat_map(|v| to_le(*v)).collect()
}

#[derive(Debug, Default)]
struct Scalars {
    flag: bool,
    small: u8,
    medium: u16,
    large: u32,
    tiny: i8,
    short: i16,
    int: i32,
    long: i64,
    single: f32,
    double: f64,
    text: String,
}

tensor_record!(Scalars {
    flag: "flag",
    small: "small",
    medium: "medium",
    large: "large",
    tiny: "tiny",
    short: "short",
    int: "int",
    long: "long",
    single: "single",
    double: "double",
    text: "text",
});

#[test]
fn scalars_of_every_element_type() {
    let mut response = ModelInferResponse::new("scalars");
    response
        .push_output("flag", "BOOL", vec![1], vec![1])
        .push_output("small", "UINT8", vec![1], vec![200])
        .push_output("medium", "UINT16", vec![1], 0xBEEFu16.to_le_bytes().to_vec())
        .push_output("large", "UINT32", vec![1], 0xDEAD_BEEFu32.to_le_bytes().to_vec())
        .push_output("tiny", "INT8", vec![1], (-5i8).to_le_bytes().to_vec())
        .push_output("short", "INT16", vec![1], (-300i16).to_le_bytes().to_vec())
        .push_output("int", "INT32", vec![1], vec![0x01, 0x00, 0x00, 0x00])
        .push_output("long", "INT64", vec![1], i64::MIN.to_le_bytes().to_vec())
        .push_output("single", "FLOAT32", vec![1], (-0.125f32).to_le_bytes().to_vec())
        .push_output("double", "FLOAT64", vec![1], 2.5f64.to_le_bytes().to_vec())
        .push_output("text", "STRING", vec![1], encode_string_payload(["héllo"]));

    let mut out = Scalars::default();
    decode(&response, &mut out).unwrap();

    assert!(out.flag);
    assert_eq!(out.small, 200);
    assert_eq!(out.medium, 0xBEEF);
    assert_eq!(out.large, 0xDEAD_BEEF);
    assert_eq!(out.tiny, -5);
    assert_eq!(out.short, -300);
    assert_eq!(out.int, 1);
    assert_eq!(out.long, i64::MIN);
    assert_eq!(out.single, -0.125);
    assert_eq!(out.double, 2.5);
    assert_eq!(out.text, "héllo");
}

#[derive(Debug, Default)]
struct Score {
    score: f32,
}

tensor_record!(Score { score: "score" });

#[test]
fn score_scenario() {
    let mut response = ModelInferResponse::new("scorer");
    response.push_output("score", "FLOAT32", vec![1], vec![0x00, 0x00, 0x80, 0x3F]);

    let mut out = Score::default();
    decode(&response, &mut out).unwrap();
    assert_eq!(out.score, 1.0);
}

#[derive(Debug, Default)]
struct Arrays {
    ids: Vec<i64>,
    grid: Vec<Vec<u16>>,
    words: Vec<String>,
    table: Vec<Vec<String>>,
}

tensor_record!(Arrays {
    ids: "ids",
    grid: "grid",
    words: "words",
    table: "table",
});

#[test]
fn arrays_keep_payload_order() {
    let mut response = ModelInferResponse::new("arrays");
    response
        .push_output("ids", "INT64", vec![1, 4], le(&[4i64, -3, 2, -1], i64::to_le_bytes))
        .push_output(
            "grid",
            "UINT16",
            vec![3, 2],
            le(&[1u16, 2, 3, 4, 5, 6], u16::to_le_bytes),
        )
        .push_output(
            "words",
            "STRING",
            vec![1, 4],
            encode_string_payload(["", "a", "", "日本"]),
        )
        .push_output(
            "table",
            "STRING",
            vec![2, 3],
            encode_string_payload(["r0c0", "r0c1", "r0c2", "r1c0", "", "r1c2"]),
        );

    let mut out = Arrays::default();
    decode(&response, &mut out).unwrap();

    assert_eq!(out.ids, vec![4, -3, 2, -1]);
    assert_eq!(out.grid, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    assert_eq!(out.words, vec!["", "a", "", "日本"]);
    assert_eq!(
        out.table,
        vec![vec!["r0c0", "r0c1", "r0c2"], vec!["r1c0", "", "r1c2"]]
    );
}

#[test]
fn zero_length_arrays() {
    let mut response = ModelInferResponse::new("arrays");
    response
        .push_output("ids", "INT64", vec![1, 0], Vec::new())
        .push_output("grid", "UINT16", vec![0, 2], Vec::new())
        .push_output("words", "STRING", vec![1, 0], Vec::new())
        .push_output("table", "STRING", vec![0, 3], Vec::new());

    let mut out = Arrays {
        ids: vec![1],
        grid: vec![vec![1]],
        words: vec!["stale".to_string()],
        table: vec![vec!["stale".to_string()]],
    };
    decode(&response, &mut out).unwrap();

    assert!(out.ids.is_empty());
    assert!(out.grid.is_empty());
    assert!(out.words.is_empty());
    assert!(out.table.is_empty());
}

#[test]
fn zero_column_matrices_keep_their_rows() {
    #[derive(Default)]
    struct Columns {
        labels: Vec<Vec<String>>,
        counts: Vec<Vec<i32>>,
    }
    tensor_record!(Columns {
        labels: "labels",
        counts: "counts",
    });

    let mut response = ModelInferResponse::new("m");
    response
        .push_output("labels", "STRING", vec![3, 0], Vec::new())
        .push_output("counts", "INT32", vec![3, 0], Vec::new());

    let mut out = Columns::default();
    decode(&response, &mut out).unwrap();
    assert_eq!(out.labels, vec![Vec::<String>::new(); 3]);
    assert_eq!(out.counts, vec![Vec::<i32>::new(); 3]);
}

#[test]
fn oversized_outer_dimension_is_invalid() {
    #[derive(Default)]
    struct Grid {
        grid: Vec<Vec<i32>>,
    }
    tensor_record!(Grid { grid: "grid" });

    let mut response = ModelInferResponse::new("m");
    response.push_output("grid", "INT32", vec![i64::MAX, 0], Vec::new());

    let mut out = Grid::default();
    let err = decode(&response, &mut out).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidDimension {
            name: "grid".to_string(),
            shape: vec![i64::MAX, 0],
        }
    );
    assert!(out.grid.is_empty());
}

#[test]
fn scalar_with_extra_elements_is_shape_mismatch() {
    #[derive(Default)]
    struct Count {
        count: i32,
    }
    tensor_record!(Count { count: "count" });

    let mut response = ModelInferResponse::new("m");
    response.push_output("count", "INT32", vec![1], le(&[7i32, 8], i32::to_le_bytes));

    let mut out = Count::default();
    let err = decode(&response, &mut out).unwrap_err();
    assert!(matches!(err, DecodeError::ShapeMismatch { ref name, .. } if name == "count"));
    assert_eq!(out.count, 0);
}

#[test]
fn empty_string_payloads_decode_to_empty_values() {
    #[derive(Default)]
    struct Strings {
        one: String,
        row: Vec<String>,
        grid: Vec<Vec<String>>,
    }
    tensor_record!(Strings {
        one: "one",
        row: "row",
        grid: "grid",
    });

    let mut response = ModelInferResponse::new("strings");
    response
        .push_output("one", "STRING", vec![1], Vec::new())
        .push_output("row", "STRING", vec![1, 3], Vec::new())
        .push_output("grid", "STRING", vec![2, 2], Vec::new());

    let mut out = Strings {
        one: "stale".to_string(),
        ..Strings::default()
    };
    decode(&response, &mut out).unwrap();
    assert_eq!(out.one, "");
    assert!(out.row.is_empty());
    assert!(out.grid.is_empty());
}

#[test]
fn wrong_element_type_is_type_mismatch() {
    #[derive(Default)]
    struct Narrow {
        value: i32,
    }
    tensor_record!(Narrow { value: "value" });

    let mut response = ModelInferResponse::new("m");
    response.push_output("value", "INT64", vec![1], 7i64.to_le_bytes().to_vec());

    let mut out = Narrow::default();
    let err = decode(&response, &mut out).unwrap_err();
    match err {
        DecodeError::TypeMismatch {
            name,
            expected,
            actual,
        } => {
            assert_eq!(name, "value");
            assert_eq!(expected.to_string(), "i32");
            assert_eq!(actual.to_string(), "i64");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(out.value, 0);
}

#[test]
fn wrong_depth_is_type_mismatch() {
    let mut response = ModelInferResponse::new("m");
    response.push_output("score", "FLOAT32", vec![1, 2], le(&[1.0f32, 2.0], f32::to_le_bytes));

    let err = decode(&response, &mut Score::default()).unwrap_err();
    assert!(matches!(err, DecodeError::TypeMismatch { .. }));
}

#[test]
fn float64_does_not_bind_to_float32() {
    let mut response = ModelInferResponse::new("m");
    response.push_output("score", "FLOAT64", vec![1], 1.0f64.to_le_bytes().to_vec());

    let err = decode(&response, &mut Score::default()).unwrap_err();
    assert!(matches!(err, DecodeError::TypeMismatch { .. }));
}

#[test]
fn rank_three_is_unsupported() {
    let mut response = ModelInferResponse::new("m");
    response.push_output("score", "FLOAT32", vec![1, 1, 1], vec![0; 4]);

    let err = decode(&response, &mut Score::default()).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedRank { rank: 3, .. }));
}

#[test]
fn rank_zero_is_unsupported() {
    let mut response = ModelInferResponse::new("m");
    response.push_output("score", "FLOAT32", vec![], vec![0; 4]);

    let err = decode(&response, &mut Score::default()).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedRank { rank: 0, .. }));
}

#[test]
fn unknown_and_unsupported_datatypes() {
    let mut response = ModelInferResponse::new("m");
    response.push_output("score", "BFLOAT16", vec![1], vec![0; 2]);
    let err = decode(&response, &mut Score::default()).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnknownDatatype {
            name: "score".to_string(),
            datatype: "BFLOAT16".to_string(),
        }
    );

    let mut response = ModelInferResponse::new("m");
    response.push_output("score", "FLOAT16", vec![1, 2], vec![0; 4]);
    let err = decode(&response, &mut Score::default()).unwrap_err();
    assert_eq!(
        err,
        DecodeError::NotYetSupported {
            name: "score".to_string(),
            datatype: "FLOAT16",
        }
    );
}

#[test]
fn truncated_payloads() {
    let mut response = ModelInferResponse::new("m");
    response.push_output("score", "FLOAT32", vec![1], vec![0x00, 0x00, 0x80]);
    let err = decode(&response, &mut Score::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));

    let mut response = ModelInferResponse::new("m");
    let mut payload = encode_string_payload(["abc"]);
    payload.truncate(5);
    response.push_output("words", "STRING", vec![1, 1], payload);
    let err = decode(&response, &mut Arrays::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));
}

#[test]
fn unbound_outputs_are_skipped_without_side_effects() {
    let mut response = ModelInferResponse::new("m");
    response
        .push_output("unused", "FLOAT16", vec![1, 2, 3], vec![0xff])
        .push_output("score", "FLOAT32", vec![1], 3.0f32.to_le_bytes().to_vec())
        .push_output("other", "WHATEVER", vec![], Vec::new());

    let mut out = Score::default();
    decode(&response, &mut out).unwrap();
    assert_eq!(out.score, 3.0);
}

#[test]
fn first_error_stops_decoding() {
    let mut response = ModelInferResponse::new("m");
    response
        .push_output("ids", "INT64", vec![1, 1], 5i64.to_le_bytes().to_vec())
        .push_output("grid", "UINT16", vec![2, 2], vec![0; 3])
        .push_output("words", "STRING", vec![1, 1], encode_string_payload(["late"]));

    let mut out = Arrays::default();
    let err = decode(&response, &mut out).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { ref name, .. } if name == "grid"));
    assert_eq!(out.ids, vec![5]);
    assert!(out.words.is_empty());
}

#[test]
fn registry_is_rebuilt_per_call() {
    let mut first = ModelInferResponse::new("m");
    first.push_output("score", "FLOAT32", vec![1], 1.0f32.to_le_bytes().to_vec());
    let mut second = ModelInferResponse::new("m");
    second.push_output("score", "FLOAT32", vec![1], 2.0f32.to_le_bytes().to_vec());

    let mut out = Score::default();
    decode(&first, &mut out).unwrap();
    assert_eq!(out.score, 1.0);
    decode(&second, &mut out).unwrap();
    assert_eq!(out.score, 2.0);
}

struct BorrowedOutput<'a> {
    name: &'a str,
    datatype: &'a str,
    shape: [i64; 2],
}

impl InferOutput for BorrowedOutput<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn datatype(&self) -> &str {
        self.datatype
    }

    fn shape(&self) -> &[i64] {
        &self.shape
    }
}

struct BorrowedResponse<'a> {
    outputs: Vec<BorrowedOutput<'a>>,
    raw: Vec<Vec<u8>>,
}

impl<'a> InferResponse for BorrowedResponse<'a> {
    type Output = BorrowedOutput<'a>;

    fn outputs(&self) -> &[BorrowedOutput<'a>] {
        &self.outputs
    }

    fn raw_output_contents(&self) -> &[Vec<u8>] {
        &self.raw
    }
}

#[test]
fn custom_response_pairs_payloads_by_position() {
    let response = BorrowedResponse {
        outputs: vec![
            BorrowedOutput {
                name: "words",
                datatype: "STRING",
                shape: [1, 1],
            },
            BorrowedOutput {
                name: "ids",
                datatype: "INT64",
                shape: [1, 1],
            },
        ],
        raw: vec![encode_string_payload(["first"]), 9i64.to_le_bytes().to_vec()],
    };

    let mut out = Arrays::default();
    decode(&response, &mut out).unwrap();
    assert_eq!(out.words, vec!["first"]);
    assert_eq!(out.ids, vec![9]);
}
