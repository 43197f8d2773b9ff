//! Limpieza de imágenes en dos fases.
//!
//! 1. Se eliminan las etiquetas EXIF identificables del bloque existente
//!    (sobre una copia en memoria, nunca sobre el original).
//! 2. Se decodifican los píxeles y se vuelven a codificar; esta fase es la
//!    que decide el resultado y descarta cualquier bloque que la primera no
//!    haya tocado.

use exif::experimental::Writer as ExifWriter;
use exif::{In, Tag};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use img_parts::{Bytes, DynImage, ImageEXIF};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::classifier::lowercase_extension;
use crate::error::{SanitizeError, SanitizeResult};

/// Fechas, dispositivo, autoría y posición GPS.
pub(crate) const IDENTIFYING_TAGS: [Tag; 16] = [
    Tag::DateTime,
    Tag::DateTimeOriginal,
    Tag::DateTimeDigitized,
    Tag::SubSecTime,
    Tag::SubSecTimeOriginal,
    Tag::SubSecTimeDigitized,
    Tag::Make,
    Tag::Model,
    Tag::Software,
    Tag::Artist,
    Tag::Copyright,
    Tag::UserComment,
    Tag::GPSLatitude,
    Tag::GPSLongitude,
    Tag::GPSLatitudeRef,
    Tag::GPSLongitudeRef,
];

pub(crate) fn strip_image_metadata(source: &Path, temp: &Path, quality: u8) -> SanitizeResult<()> {
    let original = fs::read(source).map_err(|e| SanitizeError::io("leer la imagen", e))?;

    let bytes = match scrub_identifying_tags(&original) {
        Ok(Some(edited)) => {
            debug!(source = %source.display(), "etiquetas EXIF identificables eliminadas");
            edited
        }
        Ok(None) => original,
        Err(reason) => {
            warn!(source = %source.display(), %reason, "no se pudo editar el bloque EXIF, se continúa con la recodificación");
            original
        }
    };

    let keep_png = lowercase_extension(source).as_deref() == Some("png");
    reencode_image(&bytes, keep_png, quality, temp)?;

    if !verify_image_metadata_clean(temp)? {
        return Err(SanitizeError::Verification {
            reason: "la imagen recodificada conserva campos EXIF".to_string(),
        });
    }

    Ok(())
}

/// Reescribe el bloque EXIF sin las etiquetas identificables.
///
/// Devuelve `Ok(None)` cuando el contenedor no es editable o no hay nada
/// que quitar.
pub(crate) fn scrub_identifying_tags(data: &[u8]) -> Result<Option<Vec<u8>>, String> {
    let Some(mut container) =
        DynImage::from_bytes(Bytes::copy_from_slice(data)).map_err(|e| e.to_string())?
    else {
        return Ok(None);
    };
    let Some(raw_exif) = container.exif() else {
        return Ok(None);
    };

    let exif = exif::Reader::new()
        .read_raw(raw_exif.to_vec())
        .map_err(|e| e.to_string())?;

    if !exif
        .fields()
        .any(|field| IDENTIFYING_TAGS.contains(&field.tag))
    {
        return Ok(None);
    }

    let kept: Vec<&exif::Field> = exif
        .fields()
        .filter(|field| field.ifd_num == In::PRIMARY && !IDENTIFYING_TAGS.contains(&field.tag))
        .collect();

    let rebuilt = if kept.is_empty() {
        None
    } else {
        let mut writer = ExifWriter::new();
        for field in &kept {
            writer.push_field(field);
        }
        let mut buffer = Cursor::new(Vec::new());
        writer
            .write(&mut buffer, exif.little_endian())
            .map_err(|e| e.to_string())?;
        Some(Bytes::from(buffer.into_inner()))
    };

    container.set_exif(rebuilt);

    let mut output = Vec::new();
    container
        .encoder()
        .write_to(&mut output)
        .map_err(|e| e.to_string())?;

    Ok(Some(output))
}

/// Decodifica los píxeles y los escribe en `temp` como PNG o JPEG base.
pub(crate) fn reencode_image(
    data: &[u8],
    keep_png: bool,
    quality: u8,
    temp: &Path,
) -> SanitizeResult<()> {
    let image = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| SanitizeError::io("leer la imagen", e))?
        .decode()
        .map_err(|e| SanitizeError::decode("imagen", e))?;

    let file = File::create(temp).map_err(|e| SanitizeError::io("crear la imagen limpia", e))?;
    let mut writer = BufWriter::new(file);

    let encoded = if keep_png {
        image.write_to(&mut writer, ImageFormat::Png)
    } else {
        let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
    };
    encoded.map_err(|e| SanitizeError::io("guardar la imagen limpia", e))?;

    writer
        .flush()
        .map_err(|e| SanitizeError::io("guardar la imagen limpia", e))
}

/// Comprueba que una imagen carece de campos EXIF residuales tras limpiar su metadata.
///
/// Un contenedor que no se puede interpretar no cuenta como limpio.
pub fn verify_image_metadata_clean(path: &Path) -> SanitizeResult<bool> {
    let file = File::open(path).map_err(|e| SanitizeError::io("abrir la imagen limpia", e))?;
    let mut reader = BufReader::new(file);

    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(exif.fields().next().is_none()),
        Err(exif::Error::NotFound(_)) | Err(exif::Error::BlankValue(_)) => Ok(true),
        Err(exif::Error::Io(err)) => Err(SanitizeError::io("leer metadata EXIF", err)),
        Err(other) => Err(SanitizeError::Verification {
            reason: other.to_string(),
        }),
    }
}
