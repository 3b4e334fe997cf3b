//! Implementation of `esq compile`.

use std::process::ExitCode;

use tracing::debug;

use crate::cli::{
    args::CompileCommand,
    context::CommandContext,
    output::{print_compile_error, print_json},
};

/// Compiles a condition file and prints the query document.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let compiler = match ctx.compiler(&cmd.params.params) {
        Ok(compiler) => compiler,
        Err(code) => return code,
    };
    let condition = match ctx.read_condition(&cmd.condition) {
        Ok(condition) => condition,
        Err(code) => return code,
    };

    debug!(
        condition = %cmd.condition.display(),
        fields = compiler.registry().len(),
        "compiling"
    );
    match compiler.compile(&condition) {
        Ok(compiled) => print_json(&compiled, cmd.compact),
        Err(e) => print_compile_error(&e),
    }
}
