//! Character and binary string targets.

use datum_charset::{is_binary, resolve_collation};

use crate::config::ConvertContext;
use crate::datum::Datum;
use crate::error::{Lossy, Outcome, TypeResult};
use crate::field_type::{FieldKind, FieldType};

/// Renders the input and fits it to the column width.
///
/// Binary columns count bytes, and `BINARY(n)` pads with `0x00` up to `n`.
/// Character columns count characters, so the result is always valid UTF-8; an
/// input that was not valid UTF-8 is replaced lossily and reported as truncated.
pub(super) fn to_string(
    input: &Datum,
    target: &FieldType,
    ctx: &ConvertContext,
) -> TypeResult<Lossy<Datum>> {
    let bytes = input.to_bytes()?;
    let charset = if target.charset.is_empty() {
        ctx.default_charset()
    } else {
        target.charset.as_str()
    };
    let mut outcome = Outcome::Exact;

    if is_binary(charset) {
        let mut bytes = bytes;
        if let Some(flen) = target.flen {
            let flen = flen as usize;
            if bytes.len() > flen {
                bytes.truncate(flen);
                outcome = Outcome::Truncated;
            } else if target.kind == FieldKind::String {
                bytes.resize(flen, 0);
            }
        }
        return Ok(Lossy::new(Datum::from_bytes(bytes), outcome));
    }

    let collation = resolve_collation(charset, &target.collation)?;
    let mut text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            outcome = Outcome::Truncated;
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    if let Some(flen) = target.flen {
        if let Some((cut, _)) = text.char_indices().nth(flen as usize) {
            text.truncate(cut);
            outcome = Outcome::Truncated;
        }
    }
    let mut datum = Datum::from_string(text);
    datum.set_collation(collation.id);
    Ok(Lossy::new(datum, outcome))
}
