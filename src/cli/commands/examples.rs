//! `examples` subcommand: prints one example test-DSL line per registered
//! protocol handler, grounded in the teacher's `cli::display::table`
//! `comfy_table` wrapper.

use anyhow::Result;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

use crate::Context;

/// Builds a handler for every registered protocol and renders its
/// `name()`/`example()` pair as a row.
pub fn run(ctx: &Context) -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["PROTOCOL", "EXAMPLE"]
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left)),
        );

    for name in ctx.registry.protocol_names() {
        let Some(handler) = ctx.registry.build(name) else {
            continue;
        };
        table.add_row([handler.name(), handler.example()]);
    }

    println!("{table}");
    Ok(())
}
