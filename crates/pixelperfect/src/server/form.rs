//! Multipart form parsing for `POST /api/resize`.

use axum::extract::Multipart;
use pixelperfect_core::TransformParams;

use super::ApiError;

/// A fully read upload: image bytes plus the raw transform parameters.
#[derive(Debug)]
pub struct ResizeForm {
    pub file: Vec<u8>,
    pub params: TransformParams,
}

/// Read every field of the form. Unknown fields are skipped; empty values of
/// optional fields count as absent.
pub async fn read(mut multipart: Multipart) -> Result<ResizeForm, ApiError> {
    let mut file = None;
    let mut width = None;
    let mut height = None;
    let mut format = None;
    let mut quality = None;
    let mut params = TransformParams::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            file = Some(field.bytes().await?.to_vec());
            continue;
        }

        let text = field.text().await?;
        let value = text.trim();
        match name.as_str() {
            "width" => width = Some(parse_int(&name, value)?),
            "height" => height = Some(parse_int(&name, value)?),
            "format" => format = Some(value.to_string()),
            "quality" => quality = Some(parse_float(&name, value)?),
            "crop_x" => params.crop_x = parse_optional_int(&name, value)?,
            "crop_y" => params.crop_y = parse_optional_int(&name, value)?,
            "crop_w" => params.crop_w = parse_optional_int(&name, value)?,
            "crop_h" => params.crop_h = parse_optional_int(&name, value)?,
            "progressive_jpeg" => params.progressive_jpeg = parse_bool(&name, value)?,
            "optimize_png" => params.optimize_png = parse_bool(&name, value)?,
            _ => tracing::debug!("Ignoring unknown form field {:?}", name),
        }
    }

    params.width = required("width", width)?;
    params.height = required("height", height)?;
    params.format = required("format", format)?;
    params.quality = required("quality", quality)?;
    Ok(ResizeForm {
        file: required("file", file)?,
        params,
    })
}

fn required<T>(name: &str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::InvalidField(format!("missing required field '{}'", name)))
}

fn parse_int(name: &str, value: &str) -> Result<i64, ApiError> {
    value
        .parse()
        .map_err(|_| {
            ApiError::InvalidField(format!("'{}' must be an integer, got {:?}", name, value))
        })
}

fn parse_optional_int(name: &str, value: &str) -> Result<Option<i64>, ApiError> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_int(name, value).map(Some)
    }
}

fn parse_float(name: &str, value: &str) -> Result<f32, ApiError> {
    value
        .parse()
        .map_err(|_| {
            ApiError::InvalidField(format!("'{}' must be a number, got {:?}", name, value))
        })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ApiError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "off" | "no" => Ok(false),
        "true" | "1" | "on" | "yes" => Ok(true),
        _ => Err(ApiError::InvalidField(format!(
            "'{}' must be a boolean, got {:?}",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        for yes in ["true", "TRUE", "1", "on", "yes"] {
            assert!(parse_bool("flag", yes).unwrap());
        }
        for no in ["", "false", "0", "off", "No"] {
            assert!(!parse_bool("flag", no).unwrap());
        }
        assert!(parse_bool("flag", "maybe").is_err());
    }

    #[test]
    fn test_parse_optional_int() {
        assert_eq!(parse_optional_int("crop_x", "").unwrap(), None);
        assert_eq!(parse_optional_int("crop_x", "-4").unwrap(), Some(-4));
        assert!(parse_optional_int("crop_x", "4.5").is_err());
    }

    #[test]
    fn test_required_names_field() {
        let err = required::<i64>("width", None).unwrap_err();
        assert!(err.to_string().contains("'width'"));
    }
}
