//! Labels from the rough edges of real archives.

use pvl::{loads, loads_with, Dialect, LoadOptions, Value};

#[test]
fn test_empty_input() {
    assert!(loads("").unwrap().is_empty());
    assert!(loads("   \n\t\n").unwrap().is_empty());
}

#[test]
fn test_end_only() {
    assert!(loads("END").unwrap().is_empty());
    assert!(loads("end\n").unwrap().is_empty());
}

#[test]
fn test_crlf_line_endings() {
    let m = loads("a = 1\r\nb = two\r\nEND\r\n").unwrap();
    assert_eq!(m.get("a"), Some(&Value::Integer(1)));
    assert_eq!(m.get("b"), Some(&Value::symbol("two")));
}

#[test]
fn test_nul_riddled_label() {
    // Some producers pad with NUL; Omni reads straight through it.
    let m = loads("a\0=\x001\0\nEND\0").unwrap();
    assert_eq!(m.get("a"), Some(&Value::Integer(1)));
}

#[test]
fn test_deeply_nested_blocks() {
    let depth = 24;
    let mut text = String::new();
    for i in 0..depth {
        text.push_str(&format!("OBJECT = level{i}\n"));
    }
    text.push_str("innermost = 1\n");
    for i in (0..depth).rev() {
        text.push_str(&format!("END_OBJECT = level{i}\n"));
    }
    text.push_str("END\n");

    let parsed = loads(&text).unwrap();
    let mut module = &parsed;
    for i in 0..depth {
        module = &module.get_block(&format!("level{i}")).unwrap().body;
    }
    assert_eq!(module.get("innermost"), Some(&Value::Integer(1)));
}

#[test]
fn test_comment_heavy_label() {
    let text = "\
/* product */ a /* key */ = /* eq */ 1 /* value */
/* between */
b = (1, /* inside */ 2)
END /* after end is never read";
    let m = loads(text).unwrap();
    assert_eq!(m.get("a"), Some(&Value::Integer(1)));
    assert_eq!(
        m.get("b"),
        Some(&Value::Sequence(vec![Value::from(1), Value::from(2)]))
    );
}

#[test]
fn test_isis_cube_label() {
    let text = "\
Object = IsisCube
  Object = Core
    StartByte   = 65537
    Format      = Tile
    TileSamples = 128

    Group = Dimensions
      Samples = 704
      Lines   = 3640
      Bands   = 1
    End_Group

    Group = Pixels
      Type       = Real
      ByteOrder  = Lsb
      Base       = 0.0
      Multiplier = 1.0
    End_Group
  End_Object
End_Object

Object = Label
  Bytes = 65536
End_Object
End
";
    let m = loads_with(text, &LoadOptions::new().dialect(Dialect::Isis)).unwrap();
    let cube = m.get_block("IsisCube").unwrap();
    let core = cube.body.get_block("Core").unwrap();
    assert_eq!(core.body.get("Format"), Some(&Value::symbol("Tile")));
    let pixels = core.body.get_block("Pixels").unwrap();
    assert_eq!(pixels.body.get("Base"), Some(&Value::Real(0.0)));
    assert_eq!(m.get_block("Label").unwrap().body.get("Bytes"), Some(&Value::Integer(65536)));
}

#[test]
fn test_pds3_image_label() {
    let text = "\
PDS_VERSION_ID       = PDS3
RECORD_TYPE          = FIXED_LENGTH
RECORD_BYTES         = 1024
^IMAGE               = 12
SPACECRAFT_NAME      = \"MARS GLOBAL SURVEYOR\"
START_TIME           = 1997-10-20T10:58:30.080
OBJECT               = IMAGE
  LINES              = 1024
  LINE_SAMPLES       = 1024
  SAMPLE_TYPE        = UNSIGNED_INTEGER
  SAMPLE_BITS        = 8
END_OBJECT           = IMAGE
END
";
    let m = loads_with(text, &LoadOptions::new().dialect(Dialect::Pds3)).unwrap();
    assert_eq!(m.get("^IMAGE"), Some(&Value::Integer(12)));
    assert_eq!(
        m.get("SPACECRAFT_NAME"),
        Some(&Value::string("MARS GLOBAL SURVEYOR"))
    );
    let image = m.get_block("IMAGE").unwrap();
    assert_eq!(image.body.get("SAMPLE_BITS"), Some(&Value::Integer(8)));
}

#[test]
fn test_multiline_quoted_string() {
    let m = loads("note = \"spans\n  two lines\"\nEND").unwrap();
    assert_eq!(m.get("note"), Some(&Value::string("spans\n  two lines")));
}

#[test]
fn test_duplicate_keys_at_depth() {
    let text = "\
OBJECT = TABLE
  COLUMN = a
  COLUMN = b
  COLUMN = c
END_OBJECT = TABLE
END";
    let m = loads(text).unwrap();
    let table = m.get_block("TABLE").unwrap();
    assert_eq!(table.body.get_all("COLUMN").count(), 3);
}

#[test]
fn test_signs_and_exponents() {
    let m = loads("a = -1e-5\nb = +.5\nc = 1.e3\nEND").unwrap();
    assert_eq!(m.get("a"), Some(&Value::Real(-1e-5)));
    assert_eq!(m.get("b"), Some(&Value::Real(0.5)));
    assert_eq!(m.get("c"), Some(&Value::Real(1000.0)));
}

#[test]
fn test_value_looks_like_keyword_prefix() {
    // Values that merely start like keywords stay plain symbols.
    let m = loads("a = ENDEAVOUR\nb = OBJECTIVE\nEND").unwrap();
    assert_eq!(m.get("a"), Some(&Value::symbol("ENDEAVOUR")));
    assert_eq!(m.get("b"), Some(&Value::symbol("OBJECTIVE")));
}

#[test]
fn test_aggregation_keyword_as_value() {
    // A begin keyword on the right-hand side is a plain symbol; only a
    // begin keyword in statement position opens a block.
    let m = loads("kind = Group\nEND").unwrap();
    assert_eq!(m.get("kind"), Some(&Value::symbol("Group")));

    let m = loads("Group = left\nx = 1\nEnd_Group = left\nEND").unwrap();
    assert!(m.get_block("left").is_some());
}
