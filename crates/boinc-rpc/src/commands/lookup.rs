//! `lookup`: offline code-to-label translation.

use serde::Serialize;

use boinc_rpc_core::{category_names, label_for};

use crate::cli::{GlobalOpts, LookupArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Lookup<'a> {
    category: &'a str,
    code: i32,
    label: &'static str,
}

pub fn handle(args: &LookupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let label = label_for(&args.category, args.code).map_err(|_| CliError::Validation {
        field: "category".into(),
        reason: format!(
            "unknown category '{}'; expected one of: {}",
            args.category,
            category_names().join(", ")
        ),
    })?;
    let result = Lookup {
        category: &args.category,
        code: args.code,
        label,
    };
    let out = output::render_single(&global.output, &result, |l| l.label.to_owned(), |l| {
        l.label.to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
