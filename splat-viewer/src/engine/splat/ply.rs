use std::io::Cursor;

use constants::splat::SH_C0;
use linked_hash_map::LinkedHashMap;
use ply_rs::{parser, ply};

use super::{DecodeError, SplatCloud};

type Vertex = LinkedHashMap<String, ply::Property>;

fn parse_error(err: std::io::Error) -> DecodeError {
    DecodeError::Parse(err.to_string())
}

fn scalar_size(ty: &ply::ScalarType) -> usize {
    match ty {
        ply::ScalarType::Char | ply::ScalarType::UChar => 1,
        ply::ScalarType::Short | ply::ScalarType::UShort => 2,
        ply::ScalarType::Int | ply::ScalarType::UInt | ply::ScalarType::Float => 4,
        ply::ScalarType::Double => 8,
    }
}

fn scalar_value(property: &ply::Property) -> Option<f32> {
    Some(match *property {
        ply::Property::Char(v) => v as f32,
        ply::Property::UChar(v) => v as f32,
        ply::Property::Short(v) => v as f32,
        ply::Property::UShort(v) => v as f32,
        ply::Property::Int(v) => v as f32,
        ply::Property::UInt(v) => v as f32,
        ply::Property::Float(v) => v,
        ply::Property::Double(v) => v as f32,
        _ => return None,
    })
}

/// How the colour of a vertex is stored.
enum ColorSource {
    Harmonics,
    /// `red/green/blue`, integer channels are 0..255.
    Rgb { integer: bool },
    Constant,
}

struct VertexLayout {
    color: ColorSource,
    opacity: bool,
}

impl VertexLayout {
    fn resolve(element: &ply::ElementDef) -> Result<Self, DecodeError> {
        let mut scalar_types = LinkedHashMap::new();
        for (name, property) in &element.properties {
            match &property.data_type {
                ply::PropertyType::Scalar(ty) => {
                    scalar_types.insert(name.as_str(), ty);
                }
                ply::PropertyType::List(..) => {
                    return Err(DecodeError::Unsupported("list properties on vertices".into()));
                }
            }
        }

        for name in ["x", "y", "z"] {
            if !scalar_types.contains_key(name) {
                return Err(DecodeError::MissingProperty(name));
            }
        }

        let has_all = |names: [&'static str; 3]| names.iter().all(|n| scalar_types.contains_key(n));
        let color = if has_all(["f_dc_0", "f_dc_1", "f_dc_2"]) {
            ColorSource::Harmonics
        } else if has_all(["red", "green", "blue"]) {
            let integer = !matches!(
                scalar_types.get("red"),
                Some(ply::ScalarType::Float | ply::ScalarType::Double)
            );
            ColorSource::Rgb { integer }
        } else {
            ColorSource::Constant
        };

        Ok(Self {
            color,
            opacity: scalar_types.contains_key("opacity"),
        })
    }

    fn apply(&self, vertex: &Vertex, cloud: &mut SplatCloud) {
        let value = |name: &str| vertex.get(name).and_then(scalar_value).unwrap_or(0.0);
        let channels = |names: [&str; 3]| names.map(value);

        let rgb = match self.color {
            ColorSource::Harmonics => {
                channels(["f_dc_0", "f_dc_1", "f_dc_2"]).map(|dc| (0.5 + SH_C0 * dc).clamp(0.0, 1.0))
            }
            ColorSource::Rgb { integer: true } => channels(["red", "green", "blue"]).map(|c| c / 255.0),
            ColorSource::Rgb { integer: false } => {
                channels(["red", "green", "blue"]).map(|c| c.clamp(0.0, 1.0))
            }
            ColorSource::Constant => [1.0; 3],
        };
        let alpha = if self.opacity {
            sigmoid(value("opacity"))
        } else {
            1.0
        };
        cloud.push(channels(["x", "y", "z"]), [rgb[0], rgb[1], rgb[2], alpha]);
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Reject a declared vertex count the body cannot hold before anything is read.
fn check_vertex_count(
    encoding: &ply::Encoding,
    element: &ply::ElementDef,
    body: &[u8],
) -> Result<(), DecodeError> {
    match encoding {
        ply::Encoding::Ascii => {
            let rows = body
                .split(|byte| *byte == b'\n')
                .filter(|line| !line.trim_ascii().is_empty())
                .count();
            if rows < element.count {
                return Err(DecodeError::Truncated {
                    expected: element.count,
                    actual: rows,
                    unit: "rows",
                });
            }
        }
        ply::Encoding::BinaryLittleEndian => {
            let stride: usize = element
                .properties
                .values()
                .map(|property| match &property.data_type {
                    ply::PropertyType::Scalar(ty) => scalar_size(ty),
                    ply::PropertyType::List(..) => 0,
                })
                .sum();
            let expected = stride.checked_mul(element.count).ok_or_else(|| {
                DecodeError::InvalidHeader(format!("vertex count {} is too large", element.count))
            })?;
            if body.len() < expected {
                return Err(DecodeError::Truncated {
                    expected,
                    actual: body.len(),
                    unit: "bytes",
                });
            }
        }
        ply::Encoding::BinaryBigEndian => {
            return Err(DecodeError::Unsupported("encoding 'binary_big_endian'".into()));
        }
    }
    Ok(())
}

/// Decode the leading `vertex` element of a PLY file into a splat cloud.
pub fn decode_ply(data: &[u8]) -> Result<SplatCloud, DecodeError> {
    let mut reader = Cursor::new(data);
    let vertex_parser = parser::Parser::<Vertex>::new();
    let header = vertex_parser.read_header(&mut reader).map_err(parse_error)?;

    let element = header
        .elements
        .values()
        .next()
        .ok_or_else(|| DecodeError::InvalidHeader("missing vertex element".into()))?;
    if element.name != "vertex" {
        return Err(DecodeError::Unsupported(
            "'vertex' must be the first element".into(),
        ));
    }

    let layout = VertexLayout::resolve(element)?;
    let body = data.get(reader.position() as usize..).unwrap_or_default();
    check_vertex_count(&header.encoding, element, body)?;

    let vertices = vertex_parser
        .read_payload_for_element(&mut reader, element, &header)
        .map_err(parse_error)?;

    let mut cloud = SplatCloud::with_capacity(vertices.len());
    for vertex in &vertices {
        layout.apply(vertex, &mut cloud);
    }
    Ok(cloud)
}
