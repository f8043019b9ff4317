use tracing::{debug, info};

use crate::{
    container::CompiledContainer,
    error::SchemaError,
    hooks::{Extensions, HookRef},
    layout::{resolve_schema, Step},
    parser::parse_schema,
    program::{Op, Procedure, Program},
    tokenizer::tokenize_schema,
    types::Schema,
    verifier::verify_schema,
};

/// Parse `.tw` text into a [`Schema`] without compiling it.
pub fn parse_source(text: &str) -> Result<Schema, SchemaError> {
    let tokens = tokenize_schema(text)?;
    parse_schema(&tokens)
}

/// Compile `.tw` text. Named hooks and formats the text refers to are looked
/// up in `extensions`.
pub fn compile_source(text: &str, extensions: &Extensions) -> Result<CompiledContainer, SchemaError> {
    compile(&parse_source(text)?, extensions)
}

/// Compile a schema into encode/decode procedures plus the discriminant
/// registry. All schema errors surface here; the result never fails for a
/// structural reason afterwards.
pub fn compile(schema: &Schema, extensions: &Extensions) -> Result<CompiledContainer, SchemaError> {
    verify_schema(schema, extensions)?;
    let resolved = resolve_schema(schema, extensions)?;

    let mut program = Program {
        procedures: Vec::with_capacity(resolved.layouts.len()),
        customs:    resolved.customs,
    };

    for layout in resolved.layouts {
        let mut ops = Vec::with_capacity(layout.steps.len());
        for step in layout.steps {
            ops.push(match step {
                Step::Field { attribute, format, count } => Op::Field { attribute, format, count },
                Step::LengthField {
                    attribute,
                    format,
                    slot,
                    sequences,
                } => Op::LengthField {
                    attribute,
                    format,
                    slot,
                    sequences,
                },
                Step::Hook(HookRef::Inline(hook)) => Op::Hook(hook),
                Step::Hook(HookRef::Named(name)) => match extensions.get_hook(&name) {
                    Some(hook) => Op::Hook(hook.clone()),
                    None => return Err(SchemaError::UnknownHook(name)),
                },
                Step::Raw(_) => {
                    return Err(SchemaError::NonPortable {
                        message: layout.name,
                        reason:  "raw statements only work with generated Rust source; use a hook".to_owned(),
                    })
                }
            });
        }

        debug!(message = %layout.name, ops = ops.len(), "compiled message");
        program.procedures.push(Procedure {
            name: layout.name,
            attributes: layout.attributes,
            ops,
            slots: layout.slots,
            fields: layout.fields,
        });
    }

    let container = CompiledContainer::new(program);
    info!(
        messages = container.len(),
        discriminants = container.discriminant_count(),
        "schema compiled"
    );
    Ok(container)
}
