//! EXIF container I/O.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Read EXIF from JPEG/PNG/WebP/TIFF/HEIF | `kamadak-exif` `Reader::read_from_container` |
//! | GPS IFD → [`GpsBlock`] | [`GpsBlock::from_exif`] (numeric key scheme) |
//! | Build GPS fields from [`DmsTriple`]s | [`gps_fields`] |
//! | Serialize TIFF-structured EXIF | `exif::experimental::Writer` (big-endian) |
//! | Splice into JPEG APP1 | `img-parts` `ImageEXIF::set_exif` |
//!
//! Splicing replaces only the APP1 segment, so the JPEG scan data of a
//! native carrier is carried over byte for byte. Only the primary IFD is
//! rebuilt: an IFD1 thumbnail in the old APP1 segment is not carried over.

use super::backend::BackendError;
use crate::gps::{DmsTriple, GpsBlock};
use exif::{Context, Exif, Field, In, Rational, Tag, Value};
use image::ImageFormat;
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;

/// GPSVersionID written with every new block (2.3.0.0).
pub const GPS_VERSION: [u8; 4] = [2, 3, 0, 0];

/// Tags the writer computes itself or that point at data we don't carry over.
const GENERATED_TAGS: &[Tag] = &[
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::StripOffsets,
    Tag::StripByteCounts,
    Tag::TileOffsets,
    Tag::TileByteCounts,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
];

/// TIFF image-structure tags. They describe how a TIFF source stored its
/// pixels and are wrong once the pixels have been re-encoded as JPEG.
const IMAGE_LAYOUT_TAGS: &[Tag] = &[
    Tag::ImageWidth,
    Tag::ImageLength,
    Tag::BitsPerSample,
    Tag::Compression,
    Tag::PhotometricInterpretation,
    Tag::SamplesPerPixel,
    Tag::RowsPerStrip,
    Tag::PlanarConfiguration,
    Tag::YCbCrSubSampling,
    Tag::YCbCrPositioning,
    // Predictor and SampleFormat have no named constant in kamadak-exif.
    Tag(Context::Tiff, 317),
    Tag(Context::Tiff, 339),
];

/// True if `bytes` starts with a JPEG SOI marker.
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
}

/// Parse the EXIF container embedded in an image.
///
/// `Ok(None)` when the image simply has no EXIF, including GIF and BMP,
/// which have nowhere to put it; `Err` when the container format is unknown
/// or the EXIF block is corrupt.
pub fn read_exif(bytes: &[u8]) -> Result<Option<Exif>, BackendError> {
    if matches!(
        image::guess_format(bytes),
        Ok(ImageFormat::Gif | ImageFormat::Bmp)
    ) {
        return Ok(None);
    }
    match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// GPS block of a parsed container; empty if the image has no GPS IFD.
pub fn gps_block(exif: &Exif) -> GpsBlock {
    GpsBlock::from_exif(exif)
}

/// Whether a tag is an IFD pointer or offset field the writer regenerates.
pub fn is_generated_tag(tag: Tag) -> bool {
    GENERATED_TAGS.contains(&tag)
}

/// Whether a tag describes the source's pixel storage rather than the photo.
pub fn is_layout_tag(tag: Tag) -> bool {
    IMAGE_LAYOUT_TAGS.contains(&tag)
}

/// Primary-image fields to keep when the GPS block is replaced.
///
/// Drops the whole GPS context, thumbnail IFD, generated pointer/offset tags,
/// and values of unknown type (which cannot be serialized). With
/// `transcoded`, the source's TIFF layout tags are dropped as well.
pub fn retained_fields(exif: &Exif, transcoded: bool) -> Vec<Field> {
    exif.fields()
        .filter(|f| f.ifd_num == In::PRIMARY)
        .filter(|f| f.tag.context() != Context::Gps)
        .filter(|f| !is_generated_tag(f.tag))
        .filter(|f| !(transcoded && is_layout_tag(f.tag)))
        .filter(|f| !matches!(f.value, Value::Unknown(..)))
        .map(|f| Field {
            tag: f.tag,
            ifd_num: f.ifd_num,
            value: f.value.clone(),
        })
        .collect()
}

fn ascii(c: char) -> Value {
    Value::Ascii(vec![c.to_string().into_bytes()])
}

fn rationals(dms: &DmsTriple) -> Value {
    Value::Rational(
        dms.components()
            .iter()
            .map(|f| Rational {
                num: f.numerator,
                denom: f.denominator,
            })
            .collect(),
    )
}

/// A complete, fresh GPS sub-block for the given encoded coordinates.
pub fn gps_fields(latitude: &DmsTriple, longitude: &DmsTriple) -> Vec<Field> {
    let field = |tag, value| Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    };
    vec![
        field(Tag::GPSVersionID, Value::Byte(GPS_VERSION.to_vec())),
        field(Tag::GPSLatitudeRef, ascii(latitude.reference.as_char())),
        field(Tag::GPSLatitude, rationals(latitude)),
        field(Tag::GPSLongitudeRef, ascii(longitude.reference.as_char())),
        field(Tag::GPSLongitude, rationals(longitude)),
    ]
}

/// Serialize fields into a TIFF-structured EXIF block (big-endian).
pub fn serialize(fields: &[Field]) -> Result<Vec<u8>, BackendError> {
    let mut writer = exif::experimental::Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false)?;
    Ok(buf.into_inner())
}

/// Replace the EXIF APP1 segment of a JPEG, leaving every other segment intact.
pub fn embed_in_jpeg(jpeg: &[u8], tiff: Vec<u8>) -> Result<Vec<u8>, BackendError> {
    let mut jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(jpeg))?;
    jpeg.set_exif(Some(Bytes::from(tiff)));
    Ok(jpeg.encoder().bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::{Axis, encode};
    use crate::test_helpers::{encoded_bytes, jpeg_with_exif, png_bytes, rgb_jpeg_bytes};

    fn fields_for(lat: f64, lon: f64) -> Vec<Field> {
        gps_fields(
            &encode(lat, Axis::Latitude).unwrap(),
            &encode(lon, Axis::Longitude).unwrap(),
        )
    }

    #[test]
    fn jpeg_without_exif_reads_as_none() {
        assert!(read_exif(&rgb_jpeg_bytes(4, 4)).unwrap().is_none());
    }

    #[test]
    fn unknown_container_is_an_error() {
        assert!(read_exif(b"\0\x01 certainly not an image").is_err());
    }

    #[test]
    fn gif_and_bmp_have_no_exif() {
        for format in [ImageFormat::Gif, ImageFormat::Bmp] {
            let bytes = encoded_bytes(4, 4, format);
            assert!(read_exif(&bytes).unwrap().is_none(), "{format:?}");
        }
    }

    #[test]
    fn png_without_exif_reads_as_none() {
        assert!(read_exif(&png_bytes(4, 4, false)).unwrap().is_none());
    }

    #[test]
    fn gps_fields_are_exact_rationals() {
        let fields = fields_for(40.446_111_1, -73.9857);
        let lon = fields.iter().find(|f| f.tag == Tag::GPSLongitude).unwrap();
        match &lon.value {
            Value::Rational(r) => {
                let parts: Vec<(u32, u32)> = r.iter().map(|x| (x.num, x.denom)).collect();
                assert_eq!(parts, vec![(73, 1), (59, 1), (85200, 10000)]);
            }
            other => panic!("expected rationals, got {other:?}"),
        }
        let version = fields.iter().find(|f| f.tag == Tag::GPSVersionID).unwrap();
        assert!(matches!(&version.value, Value::Byte(v) if v == &GPS_VERSION));
    }

    #[test]
    fn serialized_block_reads_back() {
        let tiff = serialize(&fields_for(40.446_111_1, -73.9857)).unwrap();
        assert_eq!(&tiff[..4], b"MM\0*");
        let exif = exif::Reader::new().read_raw(tiff).unwrap();
        let block = gps_block(&exif);
        let fix = *crate::gps::locate(&block).fix().unwrap();
        assert!((fix.latitude - 40.446_111_1).abs() < 1e-7);
        assert!((fix.longitude + 73.9857).abs() < 1e-7);
    }

    #[test]
    fn embed_then_read_back_from_jpeg() {
        let tiff = serialize(&fields_for(-33.8688, 151.2093)).unwrap();
        let jpeg = embed_in_jpeg(&rgb_jpeg_bytes(8, 8), tiff).unwrap();
        assert!(is_jpeg(&jpeg));
        let exif = read_exif(&jpeg).unwrap().unwrap();
        let lat_ref = exif.get_field(Tag::GPSLatitudeRef, In::PRIMARY).unwrap();
        assert!(matches!(&lat_ref.value, Value::Ascii(v) if v == &vec![b"S".to_vec()]));
    }

    #[test]
    fn retained_fields_drop_gps_and_pointers() {
        let jpeg = jpeg_with_exif(
            &rgb_jpeg_bytes(8, 8),
            &[
                Field {
                    tag: Tag::Make,
                    ifd_num: In::PRIMARY,
                    value: Value::Ascii(vec![b"Acme".to_vec()]),
                },
                Field {
                    tag: Tag::FNumber,
                    ifd_num: In::PRIMARY,
                    value: Value::Rational(vec![Rational { num: 28, denom: 10 }]),
                },
            ],
            Some((10.0, 20.0)),
        );
        let exif = read_exif(&jpeg).unwrap().unwrap();
        let kept = retained_fields(&exif, false);
        let tags: Vec<Tag> = kept.iter().map(|f| f.tag).collect();
        assert!(tags.contains(&Tag::Make));
        assert!(tags.contains(&Tag::FNumber));
        assert!(tags.iter().all(|t| t.context() != Context::Gps));
        assert!(!tags.contains(&Tag::ExifIFDPointer));
        assert!(!tags.contains(&Tag::GPSInfoIFDPointer));
    }

    #[test]
    fn transcoded_sources_lose_tiff_layout_tags() {
        let tiff = encoded_bytes(9, 7, ImageFormat::Tiff);
        let exif = read_exif(&tiff).unwrap().unwrap();
        let layout = |fields: &[Field]| fields.iter().filter(|f| is_layout_tag(f.tag)).count();

        assert!(layout(&retained_fields(&exif, false)) > 0);
        assert_eq!(layout(&retained_fields(&exif, true)), 0);
    }

    #[test]
    fn jpeg_sniffing() {
        assert!(is_jpeg(&rgb_jpeg_bytes(2, 2)));
        assert!(!is_jpeg(&png_bytes(2, 2, false)));
        assert!(!is_jpeg(&[0xFF, 0xD8]));
    }
}
