use core::fmt;

use crate::UserId;

struct FieldLayout {
    name: &'static str,
    bits: u64,
    value: u64,
}

fn fields(id: &UserId) -> [FieldLayout; 5] {
    [
        FieldLayout {
            name: "sign",
            bits: 1,
            value: id.to_raw() >> 63,
        },
        FieldLayout {
            name: "timestamp",
            bits: UserId::TIMESTAMP_BITS,
            value: id.timestamp(),
        },
        FieldLayout {
            name: "datacenter_id",
            bits: UserId::DATACENTER_ID_BITS,
            value: u64::from(id.datacenter_id()),
        },
        FieldLayout {
            name: "worker_id",
            bits: UserId::WORKER_ID_BITS,
            value: u64::from(id.worker_id()),
        },
        FieldLayout {
            name: "sequence",
            bits: UserId::SEQUENCE_BITS,
            value: u64::from(id.sequence()),
        },
    ]
}

fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let pad = width.saturating_sub(s.len());
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
}

/// Renders an ID as a boxed table of its fields in decimal and hex.
pub(crate) fn write_bit_layout_debug(f: &mut fmt::Formatter<'_>, id: &UserId) -> fmt::Result {
    let fields = fields(id);

    // Widest of label, decimal, and hex per column, plus padding
    let columns: Vec<usize> = fields
        .iter()
        .map(|field| {
            let label_len = format!("{} ({})", field.name, field.bits).len();
            let dec_len = field.value.to_string().len();
            let hex_len = format!("0x{:x}", field.value).len();
            label_len.max(dec_len).max(hex_len) + 2
        })
        .collect();

    let border = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
        write!(f, "        +")?;
        for &w in &columns {
            write!(f, "{}+", "-".repeat(w))?;
        }
        writeln!(f)
    };

    writeln!(f, "UserId {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.to_raw(), id.to_raw())?;
    writeln!(f, "    padded     : {}", id.to_padded_string())?;
    writeln!(f, "    unix ms    : {}", id.unix_millis())?;
    writeln!(f, "    layout     :")?;

    border(f)?;
    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("{} ({})", field.name, field.bits), w))?;
    }
    writeln!(f)?;

    border(f)?;
    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(field.value, w))?;
    }
    writeln!(f)?;

    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("0x{:x}", field.value), w))?;
    }
    writeln!(f)?;
    border(f)?;

    write!(f, "}}")
}
