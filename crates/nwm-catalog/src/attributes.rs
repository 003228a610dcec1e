//! Attribute extraction from National Water Model file names.
//!
//! NWM output follows the convention
//! `nwm.t{HH}z.{configuration}.{model_type}[_{member}].{step}.{area}.nc`, e.g.
//! `nwm.t06z.short_range.channel_rt.f005.conus.nc` or
//! `nwm.t00z.medium_range.channel_rt_3.f012.conus.nc`.

use crate::error::AttributeError;

/// Attributes encoded in an NWM file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    /// Hour of the day (zulu) when the forecast begins
    pub reference: u32,
    /// Forecast configuration, e.g. `short_range`
    pub configuration: String,
    /// Output category, e.g. `channel_rt`
    pub model_type: String,
    /// Ensemble member, if the run was part of an ensemble
    pub member: Option<u64>,
    /// Forecast step within the run
    pub step: Option<u64>,
    /// Spatial domain, e.g. `conus`
    pub area: String,
}

/// Concatenate every ASCII digit appearing in `word`, in order.
///
/// Returns `None` if the word holds no digits.
pub fn digits_of(word: &str) -> Option<String> {
    let digits: String = word.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Pull a combined integer out of a word, e.g. `f005` -> 5, `channel_rt_3` -> 3.
///
/// Returns `None` if the word holds no digits or the digits do not fit in a `u64`.
pub fn number_from_word(word: &str) -> Option<u64> {
    digits_of(word).and_then(|digits| digits.parse::<u64>().ok())
}

/// Split a combined token into its name and member, removing `{marker}{member}` once.
///
/// The marker is `_` for model types and `_mem` for configuration directories. Only
/// the exact substring is removed; digits in any other position are recorded as the
/// member but left in the name. The pattern is built from the parsed number, so a
/// zero-padded suffix such as `_03` stays in the name.
pub(crate) fn split_member(token: &str, marker: &str) -> (String, Option<u64>) {
    match number_from_word(token) {
        Some(member) => {
            let pattern = format!("{}{}", marker, member);
            (token.replacen(&pattern, "", 1), Some(member))
        }
        None => (token.to_string(), None),
    }
}

fn segment<'a>(
    parts: &[&'a str],
    name: &str,
    index: usize,
    segment: &'static str,
) -> Result<&'a str, AttributeError> {
    parts
        .get(index)
        .copied()
        .ok_or_else(|| AttributeError::MissingSegment {
            name: name.to_string(),
            segment,
            index,
        })
}

fn not_numeric(name: &str, segment: &'static str, value: &str) -> AttributeError {
    AttributeError::NotNumeric {
        name: name.to_string(),
        segment,
        value: value.to_string(),
    }
}

/// Discover NWM attributes by looking through a file name.
///
/// Fails if the name has fewer than six dot-separated segments or if the reference
/// hour is not numeric. No other validation is performed on segment content: a member
/// or step whose digits overflow a `u64` is recorded as absent.
pub fn extract_attributes(file_name: &str) -> Result<FileAttributes, AttributeError> {
    let parts: Vec<&str> = file_name.split('.').collect();

    // Check the full shape first so a short name always reports the first missing index
    segment(&parts, file_name, 5, "area")?;

    let reference_token = segment(&parts, file_name, 1, "reference")?;
    let mut chars = reference_token.chars();
    chars.next();
    chars.next_back();
    let reference = chars
        .as_str()
        .parse::<u32>()
        .map_err(|_| not_numeric(file_name, "reference", reference_token))?;

    let configuration = segment(&parts, file_name, 2, "configuration")?.to_string();

    let model_token = segment(&parts, file_name, 3, "model type")?;
    let (model_type, member) = split_member(model_token, "_");

    let step = number_from_word(segment(&parts, file_name, 4, "step")?);

    let area = parts[5].to_string();

    Ok(FileAttributes {
        reference,
        configuration,
        model_type,
        member,
        step,
        area,
    })
}
