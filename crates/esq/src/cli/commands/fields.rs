//! Implementation of `esq fields`.

use std::process::ExitCode;

use crate::cli::{
    args::FieldsCommand,
    context::CommandContext,
    output::{print_compile_error, print_fields, print_fields_json},
};

/// Lists the field mappings a condition selects on.
pub fn run(ctx: &CommandContext, cmd: &FieldsCommand) -> ExitCode {
    let compiler = match ctx.compiler(&cmd.params.params) {
        Ok(compiler) => compiler,
        Err(code) => return code,
    };
    let condition = match ctx.read_condition(&cmd.condition) {
        Ok(condition) => condition,
        Err(code) => return code,
    };

    let mappings = match compiler.used_mappings(&condition) {
        Ok(mappings) => mappings,
        Err(e) => return print_compile_error(&e),
    };
    if cmd.json {
        print_fields_json(&mappings)
    } else {
        print_fields(&mappings)
    }
}
