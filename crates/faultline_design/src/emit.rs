//! Hierarchy descriptor emission.
//!
//! The descriptor is a C++ source artifact enumerating every module of the
//! instrumented design, its fault-injection signals and its child instances,
//! plus the table index of the top module and the reserved top-instance
//! UUID. The companion simulation runtime compiles it against its own
//! `netlistFaultInjector.hpp` header, so the textual layout is a fixed
//! contract.

use crate::error::DesignError;
use crate::table::DesignTable;
use crate::uuid::TOP_MODULE_UUID;
use std::fmt::Write;

/// The descriptor file name for the given top module.
pub fn descriptor_file_name(top: &str) -> String {
    format!("{top}FiSignals.cpp")
}

/// Renders the hierarchy descriptor for a finished design table.
///
/// Modules are emitted in table order and child instances reference modules
/// by that same order. Fails if no top module was set.
pub fn descriptor_source(table: &DesignTable) -> Result<String, DesignError> {
    let top_index = table.top_index().ok_or(DesignError::NoTopModule)?;
    let top_name = &table.modules()[top_index].name;

    let mut out = String::new();
    out.push_str(&format!(
        "\n// Auto-generated by faultline for top module {top_name}\n\n"
    ));
    out.push_str("#include \"netlistFaultInjector.hpp\"\n\n");
    out.push_str("const std::vector<module_t> modules = {\n");

    for module in table.modules() {
        out.push_str("\t{\n");
        let _ = writeln!(out, "\t\t\"{}\",", escape_backslashes(&module.name));
        out.push_str("\t\t{\n");
        for signal in &module.fi_signals {
            out.push_str("\t\t\t{\n");
            let _ = writeln!(out, "\t\t\t\t{},", signal.kind.descriptor_name());
            let _ = writeln!(out, "\t\t\t\t{},", signal.width);
            let _ = writeln!(out, "\t\t\t\t{},", signal.elem_cnt);
            let _ = writeln!(out, "\t\t\t\t{},", signal.uuid);
            out.push_str("\t\t\t},\n");
        }
        out.push_str("\t\t},\n");
        out.push_str("\t\t{\n");
        for instance in &module.instances {
            let _ = writeln!(out, "\t\t\t{{{}, {}}},", instance.module, instance.uuid);
        }
        out.push_str("\t\t}\n");
        out.push_str("\t},\n");
    }

    out.push_str("}; // modules\n\n");
    let _ = writeln!(out, "const size_t modulesTopIndex = {top_index};\n");
    let _ = writeln!(out, "const size_t modulesTopUUID = {TOP_MODULE_UUID};\n");

    Ok(out)
}

/// Doubles every backslash so escaped RTL identifiers survive as C++ string
/// literals.
fn escape_backslashes(name: &str) -> String {
    name.replace('\\', "\\\\")
}
