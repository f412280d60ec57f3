//! Canonical text rendering of decoded messages and containers.
//!
//! The output is deterministic for a given wire buffer, which is what the
//! clone tests compare: a clone is correct when its rendering matches the
//! original's. A dictionary is optional; with one, field entries also show
//! the resolved acronym.

use std::fmt::Write as _;

use ommwire_core::{DataType, Result};

use crate::dictionary::FieldDictionary;
use crate::msg::{ClassDetails, Msg, MsgKey};
use crate::payload::{Load, Payload};
use crate::view::MsgView;

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

fn line(out: &mut String, level: usize, text: &str) {
    indent(out, level);
    out.push_str(text);
    out.push('\n');
}

/// Renders a bound view without a dictionary.
pub fn render_msg(view: &MsgView) -> Result<String> {
    render_msg_with(view, None)
}

/// Renders a bound view, resolving field names through `dict` when given.
pub fn render_msg_with(view: &MsgView, dict: Option<&dyn FieldDictionary>) -> Result<String> {
    let msg = view.msg()?;
    let mut out = String::new();
    render_msg_body(&mut out, msg, dict, 0)?;
    Ok(out)
}

fn class_name(details: &ClassDetails) -> &'static str {
    match details {
        ClassDetails::Request(_) => "RequestMsg",
        ClassDetails::Refresh(_) => "RefreshMsg",
        ClassDetails::Status(_) => "StatusMsg",
        ClassDetails::Update(_) => "UpdateMsg",
        ClassDetails::Close(_) => "CloseMsg",
        ClassDetails::Ack(_) => "AckMsg",
        ClassDetails::Generic(_) => "GenericMsg",
        ClassDetails::Post(_) => "PostMsg",
    }
}

fn render_msg_body(
    out: &mut String,
    msg: &Msg,
    dict: Option<&dyn FieldDictionary>,
    level: usize,
) -> Result<()> {
    let name = class_name(&msg.details);
    line(out, level, name);
    let inner = level + 1;
    let _ = writeln!(out, "{}streamId=\"{}\"", "    ".repeat(inner), msg.stream_id);
    let _ = writeln!(out, "{}domain=\"{}\"", "    ".repeat(inner), msg.domain_type);
    render_details(out, &msg.details, inner);
    if let Some(header) = &msg.extended_header {
        let _ = writeln!(
            out,
            "{}extendedHeader=\"{}\"",
            "    ".repeat(inner),
            hex(header)
        );
    }
    if let Some(key) = &msg.msg_key {
        render_key(out, key, dict, inner)?;
    }
    if msg.payload.container_type != DataType::NoData {
        line(out, inner, "Payload");
        render_payload(out, &msg.payload, dict, inner + 1)?;
        line(out, inner, "PayloadEnd");
    }
    indent(out, level);
    out.push_str(name);
    out.push_str("End");
    out.push('\n');
    Ok(())
}

// Every class field that can reach the wire shows up here; clone
// correctness is judged by comparing these renders.
fn render_details(out: &mut String, details: &ClassDetails, level: usize) {
    let pad = "    ".repeat(level);
    match details {
        ClassDetails::Request(f) => {
            let _ = writeln!(out, "{pad}streaming=\"{}\"", f.streaming);
            let _ = writeln!(out, "{pad}pause=\"{}\"", f.pause);
            let _ = writeln!(out, "{pad}privateStream=\"{}\"", f.private_stream);
            let _ = writeln!(out, "{pad}hasView=\"{}\"", f.has_view);
            if let Some(p) = f.priority {
                let _ = writeln!(out, "{pad}priority class=\"{}\" count=\"{}\"", p.class, p.count);
            }
            if let Some(qos) = &f.qos {
                let _ = writeln!(out, "{pad}qos=\"{qos}\"");
            }
        }
        ClassDetails::Refresh(f) => {
            let _ = writeln!(out, "{pad}state=\"{}\"", f.state);
            let _ = writeln!(out, "{pad}itemGroup=\"{}\"", hex(&f.group_id));
            let _ = writeln!(out, "{pad}solicited=\"{}\"", f.solicited);
            let _ = writeln!(out, "{pad}complete=\"{}\"", f.complete);
            let _ = writeln!(out, "{pad}clearCache=\"{}\"", f.clear_cache);
            let _ = writeln!(out, "{pad}doNotCache=\"{}\"", f.do_not_cache);
            let _ = writeln!(out, "{pad}privateStream=\"{}\"", f.private_stream);
            if let Some(seq) = f.seq_num {
                let _ = writeln!(out, "{pad}seqNum=\"{seq}\"");
            }
            if let Some(part) = f.part_num {
                let _ = writeln!(out, "{pad}partNum=\"{part}\"");
            }
            if let Some(qos) = &f.qos {
                let _ = writeln!(out, "{pad}qos=\"{qos}\"");
            }
            if let Some(perm) = &f.perm_data {
                let _ = writeln!(out, "{pad}permData=\"{}\"", hex(perm));
            }
            if let Some(pui) = f.post_user_info {
                let _ = writeln!(
                    out,
                    "{pad}postUser addr=\"{}\" id=\"{}\"",
                    pui.user_addr, pui.user_id
                );
            }
        }
        ClassDetails::Status(f) => {
            let _ = writeln!(out, "{pad}clearCache=\"{}\"", f.clear_cache);
            let _ = writeln!(out, "{pad}privateStream=\"{}\"", f.private_stream);
            if let Some(state) = &f.state {
                let _ = writeln!(out, "{pad}state=\"{state}\"");
            }
            if let Some(group) = &f.group_id {
                let _ = writeln!(out, "{pad}itemGroup=\"{}\"", hex(group));
            }
            if let Some(perm) = &f.perm_data {
                let _ = writeln!(out, "{pad}permData=\"{}\"", hex(perm));
            }
            if let Some(pui) = f.post_user_info {
                let _ = writeln!(
                    out,
                    "{pad}postUser addr=\"{}\" id=\"{}\"",
                    pui.user_addr, pui.user_id
                );
            }
        }
        ClassDetails::Update(f) => {
            let _ = writeln!(out, "{pad}updateType=\"{}\"", f.update_type);
            let _ = writeln!(out, "{pad}doNotCache=\"{}\"", f.do_not_cache);
            let _ = writeln!(out, "{pad}doNotConflate=\"{}\"", f.do_not_conflate);
            let _ = writeln!(out, "{pad}doNotRipple=\"{}\"", f.do_not_ripple);
            if let Some(seq) = f.seq_num {
                let _ = writeln!(out, "{pad}seqNum=\"{seq}\"");
            }
            if let Some(conf) = f.conf_info {
                let _ = writeln!(
                    out,
                    "{pad}conflation count=\"{}\" time=\"{}\"",
                    conf.count, conf.time
                );
            }
            if let Some(perm) = &f.perm_data {
                let _ = writeln!(out, "{pad}permData=\"{}\"", hex(perm));
            }
            if let Some(pui) = f.post_user_info {
                let _ = writeln!(
                    out,
                    "{pad}postUser addr=\"{}\" id=\"{}\"",
                    pui.user_addr, pui.user_id
                );
            }
        }
        ClassDetails::Close(f) => {
            let _ = writeln!(out, "{pad}ack=\"{}\"", f.ack);
        }
        ClassDetails::Ack(f) => {
            let _ = writeln!(out, "{pad}ackId=\"{}\"", f.ack_id);
            let _ = writeln!(out, "{pad}privateStream=\"{}\"", f.private_stream);
            if let Some(nak) = f.nak_code {
                let _ = writeln!(out, "{pad}nakCode=\"{nak}\"");
            }
            if let Some(text) = &f.text {
                let _ = writeln!(out, "{pad}text=\"{text}\"");
            }
            if let Some(seq) = f.seq_num {
                let _ = writeln!(out, "{pad}seqNum=\"{seq}\"");
            }
        }
        ClassDetails::Generic(f) => {
            let _ = writeln!(out, "{pad}complete=\"{}\"", f.complete);
            let _ = writeln!(out, "{pad}providerDriven=\"{}\"", f.provider_driven);
            if let Some(seq) = f.seq_num {
                let _ = writeln!(out, "{pad}seqNum=\"{seq}\"");
            }
            if let Some(secondary) = f.secondary_seq_num {
                let _ = writeln!(out, "{pad}secondarySeqNum=\"{secondary}\"");
            }
            if let Some(part) = f.part_num {
                let _ = writeln!(out, "{pad}partNum=\"{part}\"");
            }
            if let Some(perm) = &f.perm_data {
                let _ = writeln!(out, "{pad}permData=\"{}\"", hex(perm));
            }
        }
        ClassDetails::Post(f) => {
            let _ = writeln!(
                out,
                "{pad}postUser addr=\"{}\" id=\"{}\"",
                f.post_user_info.user_addr, f.post_user_info.user_id
            );
            let _ = writeln!(out, "{pad}ackRequested=\"{}\"", f.ack_requested);
            let _ = writeln!(out, "{pad}complete=\"{}\"", f.complete);
            if let Some(post_id) = f.post_id {
                let _ = writeln!(out, "{pad}postId=\"{post_id}\"");
            }
            if let Some(rights) = f.post_user_rights {
                let _ = writeln!(out, "{pad}postUserRights=\"{rights}\"");
            }
            if let Some(seq) = f.seq_num {
                let _ = writeln!(out, "{pad}seqNum=\"{seq}\"");
            }
            if let Some(part) = f.part_num {
                let _ = writeln!(out, "{pad}partNum=\"{part}\"");
            }
            if let Some(perm) = &f.perm_data {
                let _ = writeln!(out, "{pad}permData=\"{}\"", hex(perm));
            }
        }
    }
}

fn render_key(
    out: &mut String,
    key: &MsgKey,
    dict: Option<&dyn FieldDictionary>,
    level: usize,
) -> Result<()> {
    let pad = "    ".repeat(level);
    if let Some(name) = &key.name {
        let _ = writeln!(out, "{pad}name=\"{name}\"");
    }
    if let Some(name_type) = key.name_type {
        let _ = writeln!(out, "{pad}nameType=\"{name_type}\"");
    }
    if let Some(service_id) = key.service_id {
        let _ = writeln!(out, "{pad}serviceId=\"{service_id}\"");
    }
    if let Some(filter) = key.filter {
        let _ = writeln!(out, "{pad}filter=\"{filter}\"");
    }
    if let Some(identifier) = key.identifier {
        let _ = writeln!(out, "{pad}id=\"{identifier}\"");
    }
    if let Some(attrib) = &key.attrib {
        line(out, level, "Attrib");
        render_payload(out, attrib, dict, level + 1)?;
        line(out, level, "AttribEnd");
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02X}");
    }
    s
}

/// Renders a container payload recursively.
pub fn render_payload(
    out: &mut String,
    payload: &Payload,
    dict: Option<&dyn FieldDictionary>,
    level: usize,
) -> Result<()> {
    let pad = "    ".repeat(level);
    match payload.container_type {
        DataType::NoData => line(out, level, "NoData"),
        DataType::FieldList => {
            line(out, level, "FieldList");
            for entry in payload.field_list()?.iter() {
                let entry = entry?;
                let name = dict
                    .and_then(|d| d.field_info(entry.field_id()))
                    .map(|info| format!(" name=\"{}\"", info.name))
                    .unwrap_or_default();
                indent(out, level + 1);
                let _ = write!(out, "FieldEntry fid=\"{}\"{name}", entry.field_id());
                render_load_inline(out, &entry.load(), dict, level + 1)?;
            }
            line(out, level, "FieldListEnd");
        }
        DataType::ElementList => {
            line(out, level, "ElementList");
            for entry in payload.element_list()?.iter() {
                let entry = entry?;
                indent(out, level + 1);
                let _ = write!(out, "ElementEntry name=\"{}\"", entry.name());
                render_load_inline(out, &entry.load(), dict, level + 1)?;
            }
            line(out, level, "ElementListEnd");
        }
        DataType::Map => {
            let map = payload.map()?;
            line(out, level, "Map");
            if let Some(summary) = map.summary() {
                line(out, level + 1, "Summary");
                render_payload(out, &summary, dict, level + 2)?;
                line(out, level + 1, "SummaryEnd");
            }
            for entry in map.iter() {
                let entry = entry?;
                indent(out, level + 1);
                let _ = writeln!(
                    out,
                    "MapEntry action=\"{:?}\" key=\"{}\"",
                    entry.action(),
                    entry.key().load()
                );
                render_load_block(out, &entry.data().load(), dict, level + 2)?;
            }
            line(out, level, "MapEnd");
        }
        DataType::Vector => {
            let vector = payload.vector()?;
            line(out, level, "Vector");
            if let Some(summary) = vector.summary() {
                line(out, level + 1, "Summary");
                render_payload(out, &summary, dict, level + 2)?;
                line(out, level + 1, "SummaryEnd");
            }
            for entry in vector.iter() {
                let entry = entry?;
                indent(out, level + 1);
                let _ = writeln!(
                    out,
                    "VectorEntry action=\"{:?}\" index=\"{}\"",
                    entry.action(),
                    entry.index()
                );
                render_load_block(out, &entry.data().load(), dict, level + 2)?;
            }
            line(out, level, "VectorEnd");
        }
        DataType::Series => {
            let series = payload.series()?;
            line(out, level, "Series");
            if let Some(summary) = series.summary() {
                line(out, level + 1, "Summary");
                render_payload(out, &summary, dict, level + 2)?;
                line(out, level + 1, "SummaryEnd");
            }
            for row in series.iter() {
                let row = row?;
                line(out, level + 1, "SeriesRow");
                render_payload(out, &row.payload(), dict, level + 2)?;
                line(out, level + 1, "SeriesRowEnd");
            }
            line(out, level, "SeriesEnd");
        }
        DataType::FilterList => {
            line(out, level, "FilterList");
            for entry in payload.filter_list()?.iter() {
                let entry = entry?;
                indent(out, level + 1);
                let _ = writeln!(
                    out,
                    "FilterEntry id=\"{}\" action=\"{:?}\"",
                    entry.id(),
                    entry.action()
                );
                render_load_block(out, &entry.data().load(), dict, level + 2)?;
            }
            line(out, level, "FilterListEnd");
        }
        DataType::Msg => {
            let nested = payload.msg()?;
            let msg = nested.msg()?;
            render_msg_body(out, msg, dict, level)?;
        }
        // Opaque, Xml, Json, AnsiPage: raw passthrough.
        other => {
            let _ = writeln!(out, "{pad}{other}=\"{}\"", hex(&payload.data));
        }
    }
    Ok(())
}

fn render_load_inline(
    out: &mut String,
    load: &Load,
    dict: Option<&dyn FieldDictionary>,
    level: usize,
) -> Result<()> {
    match load {
        Load::Container(p) => {
            out.push('\n');
            render_payload(out, p, dict, level + 1)?;
        }
        Load::Array(view) => {
            let _ = write!(out, " value=[");
            let mut first = true;
            for item in view.iter() {
                let item = item?;
                if !first {
                    out.push_str(", ");
                }
                let _ = write!(out, "{item}");
                first = false;
            }
            out.push_str("]\n");
        }
        other => {
            let _ = writeln!(out, " value=\"{other}\"");
        }
    }
    Ok(())
}

fn render_load_block(
    out: &mut String,
    load: &Load,
    dict: Option<&dyn FieldDictionary>,
    level: usize,
) -> Result<()> {
    match load {
        Load::Container(p) => render_payload(out, p, dict, level),
        Load::NoData => {
            line(out, level, "NoData");
            Ok(())
        }
        other => {
            indent(out, level);
            let _ = writeln!(out, "value=\"{other}\"");
            Ok(())
        }
    }
}
