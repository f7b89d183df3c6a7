//! Fixed-field formatters for individual command families.
//!
//! Every formatter follows the same discipline: a line is printed only when
//! the field it needs is present with the expected tag, and anything else is
//! silently skipped. A response the daemon reshapes underneath us therefore
//! loses lines, never the whole invocation.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde_json::Value;

use crate::render::RenderOptions;
use crate::render::value::{display_string, fill_percentage};

/// Queue capacity assumed when the daemon does not report one (4 MiB).
const DEFAULT_MAX_QUEUE_SIZE: f64 = 4_194_304.0;

/// `dot`: the graph export is one opaque text field, printed verbatim.
pub(crate) fn render_graph_export(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    if let Some(graph) = body.get("dot").and_then(Value::as_str) {
        writeln!(out, "{graph}")?;
    }
    Ok(())
}

/// `getself`: one record keyed by the node's address.
pub(crate) fn render_self_info(
    body: &Value,
    options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let Some(records) = body.get("self").and_then(Value::as_object) else {
        return Ok(());
    };
    for (address, info) in records {
        if let Some(build_name) = info.get("build_name").and_then(Value::as_str)
            && build_name != "unknown"
        {
            writeln!(out, "Build name: {build_name}")?;
        }
        if let Some(build_version) = info.get("build_version").and_then(Value::as_str)
            && build_version != "unknown"
        {
            writeln!(out, "Build version: {build_version}")?;
        }
        writeln!(out, "IPv6 address: {address}")?;
        if let Some(subnet) = info.get("subnet").and_then(Value::as_str) {
            writeln!(out, "IPv6 subnet: {subnet}")?;
        }
        if let Some(key) = info.get("key").and_then(Value::as_str) {
            writeln!(out, "Public key: {key}")?;
        }
        if let Some(coords) = info.get("coords").and_then(Value::as_str) {
            writeln!(out, "Coords: {coords}")?;
        }
        if options.verbose {
            if let Some(node_id) = info.get("node_id").and_then(Value::as_str) {
                writeln!(out, "Node ID: {node_id}")?;
            }
            if let Some(box_pub_key) = info.get("box_pub_key").and_then(Value::as_str) {
                writeln!(out, "Public encryption key: {box_pub_key}")?;
            }
            if let Some(box_sig_key) = info.get("box_sig_key").and_then(Value::as_str) {
                writeln!(out, "Public signing key: {box_sig_key}")?;
            }
        }
    }
    Ok(())
}

/// `gettuntap`/`settuntap`: one entry per tunnel interface.
pub(crate) fn render_tunnel_interface(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let Some(interfaces) = body.as_object() else {
        return Ok(());
    };
    for (name, settings) in interfaces {
        writeln!(out, "Interface name: {name}")?;
        if let Some(mtu) = settings.get("mtu").filter(|value| value.is_number()) {
            writeln!(out, "Interface MTU: {}", display_string(mtu))?;
        }
        if let Some(tap_mode) = settings.get("tap_mode").and_then(Value::as_bool) {
            writeln!(out, "TAP mode: {tap_mode}")?;
        }
    }
    Ok(())
}

#[derive(Default)]
struct PortTotals {
    queues: u64,
    size: f64,
    packets: f64,
}

/// `getswitchqueues`: aggregate counters, per-queue detail, and a per-port
/// roll-up. Aggregation state lives only for this call.
pub(crate) fn render_switch_queues(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let Some(stats) = body.get("switchqueues").and_then(Value::as_object) else {
        return Ok(());
    };
    if let Some(count) = stats.get("queues_count").and_then(Value::as_f64) {
        writeln!(out, "Active queue count: {} queues", count.max(0.0) as u64)?;
    }
    if let Some(size) = stats.get("queues_size").and_then(Value::as_f64) {
        writeln!(out, "Active queue size: {} bytes", size.max(0.0) as u64)?;
    }
    if let Some(count) = stats.get("highest_queues_count").and_then(Value::as_f64) {
        writeln!(out, "Highest queue count: {} queues", count.max(0.0) as u64)?;
    }
    if let Some(size) = stats.get("highest_queues_size").and_then(Value::as_f64) {
        writeln!(out, "Highest queue size: {} bytes", size.max(0.0) as u64)?;
    }
    let maximum_size = stats
        .get("maximum_queues_size")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_MAX_QUEUE_SIZE);
    writeln!(out, "Maximum queue size: {} bytes", maximum_size.max(0.0) as u64)?;

    let mut totals: BTreeMap<u64, PortTotals> = BTreeMap::new();
    if let Some(queues) = stats.get("queues").and_then(Value::as_array)
        && !queues.is_empty()
    {
        writeln!(out, "Active queues:")?;
        for queue in queues {
            let Some(port) = queue.get("queue_port").and_then(Value::as_f64) else {
                continue;
            };
            let Some(size) = queue.get("queue_size").and_then(Value::as_f64) else {
                continue;
            };
            let Some(packets) = queue.get("queue_packets").and_then(Value::as_f64) else {
                continue;
            };
            let Some(id) = queue.get("queue_id").and_then(Value::as_str) else {
                continue;
            };
            let entry = totals.entry(port.max(0.0) as u64).or_default();
            entry.queues += 1;
            entry.size += size;
            entry.packets += packets;
            writeln!(
                out,
                "- Switch port {}, Stream ID: {}, size: {} bytes ({}% full), {} packets",
                port.max(0.0) as u64,
                id,
                size.max(0.0) as u64,
                fill_percentage(size, maximum_size),
                packets.max(0.0) as u64
            )?;
        }
    }

    if !totals.is_empty() {
        writeln!(out, "Aggregated statistics by switchport:")?;
        for (port, entry) in &totals {
            let capacity = entry.queues as f64 * maximum_size;
            writeln!(
                out,
                "- Switch port {}, size: {} bytes ({}% full), {} packets",
                port,
                entry.size.max(0.0) as u64,
                fill_percentage(entry.size, capacity),
                entry.packets.max(0.0) as u64
            )?;
        }
    }
    Ok(())
}

/// Add/remove command families: one line per entry of four optional arrays.
pub(crate) fn render_add_remove_report(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    for (field, label) in [
        ("added", "Added"),
        ("not_added", "Not added"),
        ("removed", "Removed"),
        ("not_removed", "Not removed"),
    ] {
        if let Some(entries) = body.get(field).and_then(Value::as_array) {
            for entry in entries {
                writeln!(out, "{label}: {}", display_string(entry))?;
            }
        }
    }
    Ok(())
}

/// Header sentence plus bullet lines, or the none-found sentence when the
/// array is absent, null, or empty.
fn render_listing(
    body: &Value,
    field: &str,
    empty_sentence: &str,
    header: &str,
    out: &mut dyn Write,
) -> io::Result<()> {
    match body.get(field).and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => {
            writeln!(out, "{header}")?;
            for entry in entries {
                writeln!(out, "- {}", display_string(entry))?;
            }
        }
        _ => writeln!(out, "{empty_sentence}")?,
    }
    Ok(())
}

/// `getallowedencryptionpublickeys`.
pub(crate) fn render_allowed_keys(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    render_listing(
        body,
        "allowed_box_pubs",
        "All connections are allowed",
        "Connections are allowed only from the following public box keys:",
        out,
    )
}

/// `getmulticastinterfaces`.
pub(crate) fn render_multicast_interfaces(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    render_listing(
        body,
        "multicast_interfaces",
        "No multicast interfaces found",
        "Multicast peer discovery is active on:",
        out,
    )
}

/// `getsourcesubnets`.
pub(crate) fn render_source_subnets(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    render_listing(
        body,
        "source_subnets",
        "No source subnets found",
        "Source subnets:",
        out,
    )
}

/// `getroutes`: destination to gateway mapping.
pub(crate) fn render_routes(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    match body.get("routes").and_then(Value::as_object) {
        Some(routes) if !routes.is_empty() => {
            writeln!(out, "Routes:")?;
            for (destination, gateway) in routes {
                if let Some(gateway) = gateway.as_str() {
                    writeln!(out, "- {destination} via {gateway}")?;
                }
            }
        }
        _ => writeln!(out, "No routes found")?,
    }
    Ok(())
}

/// `gettunnelrouting`/`settunnelrouting`: absent means disabled.
pub(crate) fn render_tunnel_routing(
    body: &Value,
    _options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let enabled = body.get("enabled").and_then(Value::as_bool).unwrap_or(false);
    let state = if enabled { "enabled" } else { "disabled" };
    writeln!(out, "Tunnel routing is {state}")
}
