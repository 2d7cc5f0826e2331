use anyhow::{bail, Result};
use caseframes_core::columns::{cost_fixed_part, is_cost_field};
use caseframes_core::LoadOptions;

pub fn handle(field: &str, options: &LoadOptions) -> Result<()> {
    let templates = options.templates();
    let Some(columns) = templates.get(field) else {
        bail!("no column template for field '{}'", field);
    };
    if !is_cost_field(field) {
        for column in columns {
            println!("{column}");
        }
        return Ok(());
    }

    for column in cost_fixed_part(columns) {
        println!("{column}");
    }
    eprintln!(
        "note: {field} rows continue with cost columns whose width depends on MODEL: \
         C{{n-1}}..C0 for polynomial (2), X1,Y1,X2,Y2,.. for piecewise linear (1)"
    );
    Ok(())
}
