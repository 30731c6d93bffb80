//! Executes scheme steps against a compilation session

use crate::source::{mapping_value, scheme_value, CategoryStep, SchemeError, SchemeSource, Step};
use std::path::Path;
use vstc_compiler::{CompilationSession, SchemeValue, TokenFilter, TokenOptions, TokenSource};
use vstc_core::{Config, DiagnosticCode, Location, Report, TokenType};
use vstc_sink::TokenSink;

/// Runs the steps of one scheme file
#[derive(Debug, Clone)]
pub struct Interpreter {
    /// Scheme file path, stamped on diagnostics
    file: String,
}

impl Interpreter {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }

    /// Apply the metadata and run every step, top to bottom
    ///
    /// Diagnostics recorded while a top-level step runs point at that step.
    /// The first aborting error stops the run.
    pub fn run<S: TokenSink>(
        &self,
        source: &SchemeSource,
        session: &mut CompilationSession<S>,
    ) -> Result<(), SchemeError> {
        let header = &source.scheme;
        if let Some(code) = &header.language_code {
            session.language_code(code.as_str());
        }
        if let Some(identifier) = &header.identifier {
            session.identifier(identifier.as_str());
        }
        if let Some(name) = &header.display_name {
            session.display_name(name.as_str());
        }
        if let Some(author) = &header.author {
            session.author(author.as_str());
        }
        if let Some(stable) = header.stable {
            session.stable(stable);
        }

        for (index, step) in source.steps.iter().enumerate() {
            session
                .context_mut()
                .set_location(Some(Location::with_step(self.file.clone(), index + 1)));
            tracing::debug!(step = index + 1, op = step.op(), "running step");

            execute(step, session)?;
        }

        session.context_mut().set_location(Some(Location::new(self.file.clone())));
        Ok(())
    }
}

fn execute<S: TokenSink>(step: &Step, session: &mut CompilationSession<S>) -> Result<(), SchemeError> {
    let op = step.op();

    match step {
        Step::Vowels(body) => execute_category(op, TokenType::Vowel, body, session)?,
        Step::Consonants(body) => execute_category(op, TokenType::Consonant, body, session)?,
        Step::ConsonantVowelCombinations(body) => {
            execute_category(op, TokenType::ConsonantVowel, body, session)?
        }
        Step::Anusvara(body) => execute_category(op, TokenType::Anusvara, body, session)?,
        Step::Visarga(body) => execute_category(op, TokenType::Visarga, body, session)?,
        Step::Virama(body) => execute_category(op, TokenType::Virama, body, session)?,
        Step::Symbols(body) => execute_category(op, TokenType::Symbol, body, session)?,
        Step::Numbers(body) => execute_category(op, TokenType::Number, body, session)?,
        Step::Others(body) => execute_category(op, TokenType::Other, body, session)?,
        Step::Joiner { tokens } => session.joiner(mapping_value(tokens))?,
        Step::NonJoiner { tokens } => session.non_joiner(mapping_value(tokens))?,
        Step::Period { value } => session.period(scheme_value(value))?,
        Step::Tag { name, steps } => session.tag(name.as_str(), |session| run_nested(steps, session))?,
        Step::List { names, steps } => {
            let names: Vec<SchemeValue> = names.iter().map(scheme_value).collect();
            session.list(&names, |session| run_nested(steps, session))?
        }
        Step::GenerateCv => {
            session.generate_cv();
        }
        Step::StemRules { tokens } => session.stem_rules(mapping_value(tokens))?,
        Step::StemExceptions { tokens } => session.stem_exceptions(mapping_value(tokens))?,
        Step::InferDeadConsonants { enabled } => session.infer_dead_consonants(*enabled),
        Step::IgnoreDuplicates { enabled } => session.ignore_duplicates(*enabled),
    }

    Ok(())
}

/// Nested steps keep the location of their top-level step
fn run_nested<S: TokenSink>(steps: &[Step], session: &mut CompilationSession<S>) -> Result<(), SchemeError> {
    for step in steps {
        execute(step, session)?;
    }
    Ok(())
}

fn execute_category<S: TokenSink>(
    op: &str,
    token_type: TokenType,
    body: &CategoryStep,
    session: &mut CompilationSession<S>,
) -> Result<(), SchemeError> {
    let options = TokenOptions {
        priority: body.priority.as_ref().map(scheme_value),
        accept_if: body.accept_if.as_ref().map(scheme_value),
    };

    match (&body.tokens, &body.combine) {
        (Some(tokens), None) => session.build(token_type, &options, mapping_value(tokens))?,
        (None, Some(combine)) => {
            let source = match (&combine.source.category, &combine.source.list) {
                (Some(category), None) => match TokenType::from_category_name(category) {
                    Some(source_type) => TokenSource::Category(source_type),
                    None => {
                        return Err(invalid_step(
                            session,
                            op,
                            format!("unknown combine source category '{}'", category),
                        ))
                    }
                },
                (None, Some(list)) => TokenSource::List(list.clone()),
                _ => {
                    return Err(invalid_step(
                        session,
                        op,
                        "combine.source needs exactly one of 'category' or 'list'".to_string(),
                    ))
                }
            };

            let filter = combine
                .source
                .filter
                .as_ref()
                .map(|f| TokenFilter::from_criteria(&scheme_value(f)))
                .unwrap_or_default();

            let map = session.combine(&source, filter, mapping_value(&combine.template))?;
            session.build(token_type, &options, map)?;
        }
        _ => {
            return Err(invalid_step(
                session,
                op,
                "expected exactly one of 'tokens' or 'combine'".to_string(),
            ))
        }
    }

    Ok(())
}

/// Record a structure error and hand it back
fn invalid_step<S: TokenSink>(
    session: &mut CompilationSession<S>,
    op: &str,
    message: String,
) -> SchemeError {
    let err = SchemeError::InvalidStep {
        op: op.to_string(),
        message,
    };
    session.context_mut().error(DiagnosticCode::SchemeStructure, err.to_string());
    err
}

/// Result of compiling one scheme file
pub struct Compiled<S: TokenSink> {
    pub report: Report,

    /// The sink, holding whatever was persisted
    pub sink: S,

    /// The run stopped before finishing; nothing was flushed
    pub aborted: bool,
}

/// Read, run and finish one scheme file
///
/// Unreadable or malformed files produce a report with a single
/// `SCHEME_STRUCTURE` error.
pub fn compile_file<S: TokenSink>(path: &Path, sink: S, config: &Config) -> Compiled<S> {
    let file = path.display().to_string();
    tracing::info!(file = %file, "compiling scheme");

    let mut session = CompilationSession::with_config(sink, config.clone());

    let source = match SchemeSource::from_file(path) {
        Ok(source) => source,
        Err(err) => {
            let context = session.context_mut();
            context.set_location(Some(Location::new(file)));
            context.error(DiagnosticCode::SchemeStructure, err.to_string());
            return Compiled {
                report: session.report(),
                sink: session.into_sink(),
                aborted: true,
            };
        }
    };

    let aborted = match Interpreter::new(file.clone()).run(&source, &mut session) {
        Ok(()) => false,
        Err(err) => {
            tracing::warn!(file = %file, error = %err, "compilation aborted");
            true
        }
    };

    let report = if aborted {
        session.report()
    } else {
        session.finish().report
    };

    Compiled {
        report,
        sink: session.into_sink(),
        aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vstc_compiler::CompileError;
    use vstc_sink::MemorySink;

    fn run(toml: &str) -> (CompilationSession<MemorySink>, Result<(), SchemeError>) {
        let source = SchemeSource::from_str(toml).unwrap();
        let mut session = CompilationSession::new(MemorySink::new());
        let result = Interpreter::new("inline.scheme.toml").run(&source, &mut session);
        (session, result)
    }

    #[test]
    fn header_is_applied() {
        let (session, result) = run(
            r#"
[scheme]
language_code = "ml"
identifier = "ml-unicode"
display_name = "Malayalam"
author = "someone"
stable = true
"#,
        );
        result.unwrap();

        let details = session.details();
        assert_eq!(details.language_code, "ml");
        assert_eq!(details.identifier, "ml-unicode");
        assert_eq!(details.display_name, "Malayalam");
        assert_eq!(details.author, "someone");
        assert!(details.is_stable);
    }

    #[test]
    fn every_category_op_builds_its_token_type() {
        let (session, result) = run(
            r#"
[[step]]
op = "virama"
tokens = { "~" = "്" }

[[step]]
op = "vowels"
tokens = { "a" = "അ" }

[[step]]
op = "consonants"
tokens = { "ka" = "ക" }

[[step]]
op = "consonant_vowel_combinations"
tokens = { "kra" = "ക്ര" }

[[step]]
op = "anusvara"
tokens = { "M" = "ം" }

[[step]]
op = "visarga"
tokens = { "H" = "ഃ" }

[[step]]
op = "symbols"
tokens = { "|" = "।" }

[[step]]
op = "numbers"
tokens = { "1" = "൧" }

[[step]]
op = "others"
tokens = { "OM" = "ഓം" }
"#,
        );
        result.unwrap();

        let built: Vec<TokenType> = [
            TokenType::Virama,
            TokenType::Vowel,
            TokenType::Consonant,
            TokenType::ConsonantVowel,
            TokenType::Anusvara,
            TokenType::Visarga,
            TokenType::Symbol,
            TokenType::Number,
            TokenType::Other,
        ]
        .into_iter()
        .filter(|t| session.tokens(*t, TokenFilter::All).len() == 1)
        .collect();
        assert_eq!(built.len(), 9);
    }

    #[test]
    fn diagnostics_point_at_the_running_step() {
        let (session, result) = run(
            r#"
[[step]]
op = "vowels"
tokens = { "a" = "അ" }

[[step]]
op = "consonants"
tokens = { "ka" = ["ക", "", "", "x"] }

[[step]]
op = "symbols"
tokens = "not a mapping"
"#,
        );

        assert!(matches!(
            result,
            Err(SchemeError::Compile(CompileError::NotAMapping { .. }))
        ));

        let diagnostics = session.context().diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].code, DiagnosticCode::ShapeExtraValues);
        assert_eq!(
            diagnostics[0].location,
            Some(Location::with_step("inline.scheme.toml", 2))
        );
        assert_eq!(diagnostics[1].code, DiagnosticCode::ShapeNotAMapping);
        assert_eq!(
            diagnostics[1].location,
            Some(Location::with_step("inline.scheme.toml", 3))
        );
    }

    #[test]
    fn tag_steps_tag_their_tokens() {
        let (session, result) = run(
            r#"
[[step]]
op = "tag"
name = "chill"

  [[step.steps]]
  op = "consonants"
  tokens = { "n" = "ൻ" }

[[step]]
op = "consonants"
tokens = { "na" = "ന" }
"#,
        );
        result.unwrap();

        let tags: Vec<(&str, &str)> = session
            .get_consonants(TokenFilter::All)
            .iter()
            .map(|t| (t.pattern.as_str(), t.tag.as_str()))
            .collect();
        assert_eq!(tags, vec![("n", "chill"), ("na", "")]);
        assert_eq!(session.context().current_tag(), None);
    }

    #[test]
    fn nested_list_steps_abort() {
        let (session, result) = run(
            r#"
[[step]]
op = "list"
names = ["outer"]

  [[step.steps]]
  op = "list"
  names = ["inner"]
"#,
        );

        assert!(matches!(
            result,
            Err(SchemeError::Compile(CompileError::NestedList))
        ));
        assert_eq!(session.context().diagnostics()[0].code, DiagnosticCode::ListNested);
        assert!(!session.lists().is_open());
    }

    #[test]
    fn combine_from_a_list() {
        let (session, result) = run(
            r#"
[[step]]
op = "list"
names = ["velars"]

  [[step.steps]]
  op = "consonants"
  tokens = { "ka" = "ക", "ga" = "ഗ" }

[[step]]
op = "others"

  [step.combine]
  source = { list = "velars" }
  template = { "*_" = "*1്" }
"#,
        );
        result.unwrap();

        let others: Vec<String> = session
            .get_others(TokenFilter::All)
            .iter()
            .map(|t| format!("{} => {}", t.pattern, t.value1))
            .collect();
        assert_eq!(others, vec!["ka_ => ക്", "ga_ => ഗ്"]);
    }

    #[test]
    fn category_step_needs_tokens_or_combine() {
        let (session, result) = run(
            r#"
[[step]]
op = "vowels"
priority = "high"
"#,
        );

        assert!(matches!(result, Err(SchemeError::InvalidStep { .. })));
        let diagnostics = session.context().diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::SchemeStructure);
        assert!(diagnostics[0].message.contains("vowels"));
    }

    #[test]
    fn invalid_step_inside_a_tag_restores_the_tag() {
        let (session, result) = run(
            r#"
[[step]]
op = "tag"
name = "broken"

  [[step.steps]]
  op = "others"

    [step.steps.combine]
    source = { category = "letters" }
    template = { "*" = "*1" }
"#,
        );

        assert!(matches!(result, Err(SchemeError::InvalidStep { .. })));
        assert!(session.context().error_messages()[0].contains("unknown combine source category 'letters'"));
        assert_eq!(session.context().current_tag(), None);
    }

    #[test]
    fn compile_file_reports_unreadable_files() {
        let compiled = compile_file(
            Path::new("/nonexistent/xx.scheme.toml"),
            MemorySink::new(),
            &Config::default(),
        );

        assert!(compiled.aborted);
        assert_eq!(compiled.report.summary.errors, 1);
        assert_eq!(
            compiled.report.diagnostics[0].code,
            DiagnosticCode::SchemeStructure
        );
        assert_eq!(compiled.sink.token_count(), 0);
    }
}
