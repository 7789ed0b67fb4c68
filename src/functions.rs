//! `/name arg; arg; ...` calls.
//!
//! `introduce` registers a character. `include` splices another play file in
//! place: its tokens go through the same engine, with the same act/scene
//! cursors, while each node keeps its own file and line.

use crate::ast::FunctionCall;
use crate::engine::Engine;
use crate::error::ParseError;
use crate::include::render_chain;
use crate::types::{Character, Context, Violation, ViolationKind};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{debug, info};

type Handler = fn(&mut Engine, &[String], &Context) -> Result<(), ParseError>;

struct Function {
    name: &'static str,
    arity: RangeInclusive<usize>,
    handler: Handler,
}

static FUNCTIONS: &[Function] = &[
    Function {
        name: "introduce",
        arity: 2..=3,
        handler: introduce,
    },
    Function {
        name: "include",
        arity: 1..=1,
        handler: include,
    },
];

pub(crate) fn call(
    engine: &mut Engine,
    call: &FunctionCall,
    context: &Context,
) -> Result<(), ParseError> {
    let Some(function) = FUNCTIONS.iter().find(|f| f.name == call.name) else {
        let violation = Violation::new(
            ViolationKind::UnknownFunction,
            format!("Called to undefined function '{}'", call.name),
            context.clone(),
        );
        return engine.reject(violation, ParseError::UnknownFunction);
    };

    if !function.arity.contains(&call.arguments.len()) {
        let expected = if function.arity.start() == function.arity.end() {
            function.arity.start().to_string()
        } else {
            format!("{} to {}", function.arity.start(), function.arity.end())
        };
        let violation = Violation::new(
            ViolationKind::InvalidArguments,
            format!(
                "Function '{}' takes {} argument(s), got {}",
                function.name,
                expected,
                call.arguments.len()
            ),
            context.clone(),
        );
        return engine.reject(violation, ParseError::InvalidArguments);
    }

    (function.handler)(engine, &call.arguments, context)
}

fn invalid(engine: &mut Engine, description: &str, context: &Context) -> Result<(), ParseError> {
    let violation = Violation::new(ViolationKind::InvalidArguments, description, context.clone());
    engine.reject(violation, ParseError::InvalidArguments)
}

fn introduce(engine: &mut Engine, args: &[String], context: &Context) -> Result<(), ParseError> {
    let handle = &args[0];
    let display_name = &args[1];
    if handle.is_empty() || display_name.is_empty() {
        return invalid(
            engine,
            "Function 'introduce' needs a handle and a name",
            context,
        );
    }
    let introduction = args.get(2).cloned();

    info!(
        location = %context,
        handle = %handle,
        name = %display_name,
        "Introducing character"
    );
    if let Some(previous) = engine.characters.get(handle) {
        let description = format!(
            "Character handle {} was previously introduced in {}",
            handle, previous.context
        );
        engine.warn(ViolationKind::DuplicateDefinition, description, context);
    }
    engine.characters.insert(
        handle.clone(),
        Character {
            handle: handle.clone(),
            display_name: display_name.clone(),
            context: context.clone(),
            introduction,
        },
    );
    Ok(())
}

fn include(engine: &mut Engine, args: &[String], context: &Context) -> Result<(), ParseError> {
    let target = &args[0];
    if target.is_empty() {
        return invalid(engine, "Function 'include' needs a path", context);
    }

    let base = context.path().parent().unwrap_or(Path::new(""));
    let candidate = base.join(target);
    if !candidate.is_file() {
        let violation = Violation::new(
            ViolationKind::MissingInclude,
            format!("Included path {} is not an existing file", target),
            context.clone(),
        );
        return engine.reject(violation, ParseError::MissingInclude);
    }
    let path = fs::canonicalize(&candidate).map_err(|e| ParseError::io(&candidate, e))?;

    if let Err(chain) = engine.includes.enter(&path) {
        let violation = Violation::new(
            ViolationKind::CyclicInclude,
            format!(
                "Cannot process file {} - circular include ({})",
                path.display(),
                render_chain(&chain)
            ),
            context.clone(),
        );
        return engine.reject(violation, |violation| ParseError::CyclicInclude {
            chain,
            violation,
        });
    }

    debug!(
        location = %context,
        path = %path.display(),
        depth = engine.includes.depth(),
        "Entering include"
    );
    let outcome = fs::read_to_string(&path)
        .map_err(|e| ParseError::io(&path, e))
        .and_then(|source| engine.tokenize(&path, &source));
    engine.includes.leave();
    debug!(path = %path.display(), "Leaving include");
    outcome
}
