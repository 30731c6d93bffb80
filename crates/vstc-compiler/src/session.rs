//! Compilation session
//!
//! A [`CompilationSession`] is the state of exactly one compilation: the
//! token sink, the diagnostics, the per-type cache of built tokens, the named
//! lists and the scheme metadata. Every scheme operation is a method on it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vstc_compiler::{CompilationSession, SchemeValue, TokenOptions};
//! use vstc_sink::MemorySink;
//!
//! let mut session = CompilationSession::new(MemorySink::new());
//! session.language_code("ml");
//! session.identifier("ml-unicode");
//! session.vowels(&TokenOptions::default(), SchemeValue::map(vec![("a", "അ")]))?;
//! let outcome = session.finish();
//! assert!(!outcome.report.has_errors());
//! ```

use crate::combine;
use crate::context::DiagnosticsContext;
use crate::cv;
use crate::error::CompileError;
use crate::lists::ListRegistry;
use crate::resolve::{resolve_accept, resolve_priority};
use crate::validate::validate;
use crate::value::{PatternValue, SchemeValue, TokenMap};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use vstc_core::{
    AcceptCondition, Config, DiagnosticCode, MatchType, Priority, Report, SchemeDetails, Token,
    TokenType,
};
use vstc_sink::{SinkOption, TokenSink};

/// `priority` and `accept_if` as written in the scheme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenOptions {
    pub priority: Option<SchemeValue>,
    pub accept_if: Option<SchemeValue>,
}

impl TokenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: impl Into<SchemeValue>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_accept_if(mut self, accept_if: impl Into<SchemeValue>) -> Self {
        self.accept_if = Some(accept_if.into());
        self
    }
}

/// Match type selection for token queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenFilter {
    #[default]
    All,
    Exact,
    Possibility,
}

impl TokenFilter {
    /// `{}` selects everything, `{exact = true}` exact matches, anything else possibilities
    pub fn from_criteria(criteria: &SchemeValue) -> Self {
        match criteria {
            SchemeValue::Map(pairs) if pairs.is_empty() => Self::All,
            SchemeValue::Map(pairs) => {
                let exact = pairs
                    .iter()
                    .any(|(k, v)| k.as_str() == Some("exact") && v.is_truthy());
                if exact {
                    Self::Exact
                } else {
                    Self::Possibility
                }
            }
            _ => Self::Possibility,
        }
    }

    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Self::All => true,
            Self::Exact => token.match_type == MatchType::Exact,
            Self::Possibility => token.match_type == MatchType::Possibility,
        }
    }
}

/// Where a `combine` takes its tokens from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Category(TokenType),
    List(String),
}

/// Result of a finished compilation
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub report: Report,
    pub details: SchemeDetails,
}

/// State of one compilation
pub struct CompilationSession<S: TokenSink> {
    sink: S,
    config: Config,
    context: DiagnosticsContext,

    /// Tokens built so far, by type
    cache: HashMap<TokenType, Vec<Rc<Token>>>,

    lists: ListRegistry,

    /// Categories the scheme declared itself, so no default is injected
    overridden: HashSet<TokenType>,

    details: SchemeDetails,
    tokens_created: usize,
}

impl<S: TokenSink> CompilationSession<S> {
    /// Create a session with the default configuration
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, Config::default())
    }

    /// Create a session; the sink is told the configured inherent vowel
    pub fn with_config(sink: S, config: Config) -> Self {
        tracing::info!(sink = sink.name(), "starting compilation");
        let inherent_vowel = config.inherent_vowel;
        let mut session = Self {
            context: DiagnosticsContext::with_severity(config.severity.clone()),
            sink,
            config,
            cache: HashMap::new(),
            lists: ListRegistry::new(),
            overridden: HashSet::new(),
            details: SchemeDetails::default(),
            tokens_created: 0,
        };
        session.configure(SinkOption::InherentVowel(inherent_vowel));
        session
    }

    pub fn context(&self) -> &DiagnosticsContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut DiagnosticsContext {
        &mut self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Recover the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Record an aborting error and hand it back for `?`
    fn abort(&mut self, err: CompileError) -> CompileError {
        self.context.error(err.code(), err.to_string());
        err
    }

    /// Record an error against a `pattern => value` expression
    fn error_in(&mut self, code: DiagnosticCode, expression: String, message: String) {
        let previous = self.context.current_expression().map(str::to_string);
        self.context.set_expression(Some(expression));
        self.context.error(code, message);
        self.context.set_expression(previous);
    }

    // =========================================================================
    // Token building
    // =========================================================================

    /// Validate `mapping`, resolve `options` and build one token per pattern
    pub fn build(
        &mut self,
        token_type: TokenType,
        options: &TokenOptions,
        mapping: impl Into<SchemeValue>,
    ) -> Result<(), CompileError> {
        let map = validate(&mapping.into(), &mut self.context)?;
        let priority = resolve_priority(options.priority.as_ref()).map_err(|e| self.abort(e))?;
        let accept = resolve_accept(options.accept_if.as_ref()).map_err(|e| self.abort(e))?;

        self.build_tokens(token_type, &map, priority, accept);
        Ok(())
    }

    /// Build tokens from a validated map
    ///
    /// A scalar key yields one exact token. A key group yields one possibility
    /// token per pattern in it, all sharing the same values. Returns the number
    /// of tokens the sink accepted.
    pub fn build_tokens(
        &mut self,
        token_type: TokenType,
        map: &TokenMap,
        priority: Priority,
        accept: AcceptCondition,
    ) -> usize {
        let mut created = 0;

        for (key, value) in map.iter() {
            let values = value.leaves();
            let slot = |i: usize| values.get(i).copied().unwrap_or_default();

            let (patterns, match_type) = match key {
                PatternValue::Scalar(pattern) => (vec![pattern.as_str()], MatchType::Exact),
                group @ PatternValue::Group(_) => (group.leaves(), MatchType::Possibility),
            };

            for pattern in patterns {
                let token = Token::new(token_type, pattern, slot(0))
                    .with_values(slot(1), slot(2))
                    .with_match_type(match_type)
                    .with_priority(priority)
                    .with_accept_condition(accept);

                if self.persist(token) {
                    created += 1;
                }
            }
        }

        created
    }

    /// Hand a token to the sink, then cache it and add it to the open lists
    fn persist(&mut self, mut token: Token) -> bool {
        token.tag = self.context.current_tag().unwrap_or_default().to_string();
        let expression = format!("{} => {}", token.pattern, token.value1);

        if token.pattern.is_empty() || token.value1.is_empty() {
            self.error_in(
                DiagnosticCode::ShapeEmptyValue,
                expression,
                "Empty patterns and values are not allowed".to_string(),
            );
            return false;
        }

        if let Err(e) = self.sink.create_token(&token) {
            self.error_in(DiagnosticCode::SinkRejected, expression, e.to_string());
            return false;
        }

        tracing::debug!(
            pattern = %token.pattern,
            value = %token.value1,
            token_type = %token.token_type,
            match_type = %token.match_type,
            "created token"
        );

        let token = Rc::new(token);
        self.lists.record(&token);
        self.cache.entry(token.token_type).or_default().push(token);
        self.tokens_created += 1;
        true
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn vowels(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Vowel, options, mapping)
    }

    pub fn consonants(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Consonant, options, mapping)
    }

    pub fn consonant_vowel_combinations(
        &mut self,
        options: &TokenOptions,
        mapping: impl Into<SchemeValue>,
    ) -> Result<(), CompileError> {
        self.build(TokenType::ConsonantVowel, options, mapping)
    }

    pub fn anusvara(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Anusvara, options, mapping)
    }

    pub fn visarga(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Visarga, options, mapping)
    }

    pub fn virama(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Virama, options, mapping)
    }

    pub fn symbols(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Symbol, options, mapping)
    }

    pub fn numbers(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Number, options, mapping)
    }

    pub fn others(&mut self, options: &TokenOptions, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.build(TokenType::Other, options, mapping)
    }

    /// Declare the non-joiner; the default one is then not injected
    pub fn non_joiner(&mut self, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.overridden.insert(TokenType::NonJoiner);
        self.build(TokenType::NonJoiner, &TokenOptions::default(), mapping)
    }

    /// Declare the joiner; the default one is then not injected
    pub fn joiner(&mut self, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        self.overridden.insert(TokenType::Joiner);
        self.build(TokenType::Joiner, &TokenOptions::default(), mapping)
    }

    /// Map `.` to `value`
    pub fn period(&mut self, value: impl Into<SchemeValue>) -> Result<(), CompileError> {
        let mapping = SchemeValue::Map(vec![(SchemeValue::from("."), value.into())]);
        self.build(TokenType::Period, &TokenOptions::default(), mapping)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn language_code(&mut self, code: impl Into<String>) {
        self.details.language_code = code.into();
    }

    pub fn identifier(&mut self, identifier: impl Into<String>) {
        self.details.identifier = identifier.into();
    }

    pub fn display_name(&mut self, name: impl Into<String>) {
        self.details.display_name = name.into();
    }

    pub fn author(&mut self, author: impl Into<String>) {
        self.details.author = author.into();
    }

    pub fn stable(&mut self, stable: bool) {
        self.details.is_stable = stable;
    }

    pub fn details(&self) -> &SchemeDetails {
        &self.details
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Run `body` with `name` as the active tag
    ///
    /// The previous tag is restored afterwards, also when `body` fails.
    pub fn tag<T, E>(
        &mut self,
        name: impl Into<String>,
        body: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let previous = self.context.set_tag(Some(name.into()));
        let result = body(self);
        self.context.set_tag(previous);
        result
    }

    /// Run `body` with a list scope over `names` open
    ///
    /// Nested scopes, an empty name set and names that are not strings abort.
    /// The scope is closed afterwards, also when `body` fails.
    pub fn list<T, E: From<CompileError>>(
        &mut self,
        names: &[SchemeValue],
        body: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        if let Err(err) = self.lists.open(names) {
            return Err(self.abort(err).into());
        }
        let result = body(self);
        self.lists.close();
        result
    }

    pub fn lists(&self) -> &ListRegistry {
        &self.lists
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Built tokens of a type, in build order
    pub fn tokens(&self, token_type: TokenType, filter: TokenFilter) -> Vec<&Token> {
        self.cache
            .get(&token_type)
            .map(|tokens| {
                tokens
                    .iter()
                    .map(|t| t.as_ref())
                    .filter(|t| filter.matches(t))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_vowels(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::Vowel, filter)
    }

    pub fn get_consonants(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::Consonant, filter)
    }

    pub fn get_consonant_vowel_combinations(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::ConsonantVowel, filter)
    }

    pub fn get_anusvara(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::Anusvara, filter)
    }

    pub fn get_visarga(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::Visarga, filter)
    }

    pub fn get_symbols(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::Symbol, filter)
    }

    pub fn get_numbers(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::Number, filter)
    }

    pub fn get_others(&self, filter: TokenFilter) -> Vec<&Token> {
        self.tokens(TokenType::Other, filter)
    }

    /// The first declared virama; aborts when there is none
    pub fn get_virama(&mut self) -> Result<&Token, CompileError> {
        if self.tokens(TokenType::Virama, TokenFilter::All).is_empty() {
            return Err(self.abort(CompileError::ViramaNotSet));
        }
        self.cache
            .get(&TokenType::Virama)
            .and_then(|tokens| tokens.first())
            .map(|t| t.as_ref())
            .ok_or(CompileError::ViramaNotSet)
    }

    /// Dead consonants as the sink knows them
    ///
    /// The sink derives most of these itself, so they are read back and replace
    /// the cached set. A failing read is recorded and the cache kept.
    pub fn get_dead_consonants(&mut self, filter: TokenFilter) -> Vec<&Token> {
        self.refresh_dead_consonants();
        self.tokens(TokenType::DeadConsonant, filter)
    }

    fn refresh_dead_consonants(&mut self) {
        match self.sink.get_all_tokens(TokenType::DeadConsonant) {
            Ok(tokens) => {
                tracing::debug!(count = tokens.len(), "read dead consonants from sink");
                self.cache.insert(
                    TokenType::DeadConsonant,
                    tokens.into_iter().map(Rc::new).collect(),
                );
            }
            Err(e) => self.context.error(DiagnosticCode::SinkFailure, e.to_string()),
        }
    }

    /// Tokens of a named list; aborts when the list was never declared
    pub fn custom_list(&mut self, name: &str) -> Result<Vec<&Token>, CompileError> {
        if !self.lists.contains(name) {
            return Err(self.abort(CompileError::UnknownList(name.to_string())));
        }
        Ok(self
            .lists
            .get(name)
            .map(|list| list.tokens().collect())
            .unwrap_or_default())
    }

    // =========================================================================
    // Generators
    // =========================================================================

    /// Build every consonant × vowel compound from the tokens built so far
    ///
    /// Returns the number of compounds the sink accepted.
    pub fn generate_cv(&mut self) -> usize {
        let vowels = self.cache.get(&TokenType::Vowel).cloned().unwrap_or_default();
        let consonants = self.cache.get(&TokenType::Consonant).cloned().unwrap_or_default();

        let vowel_refs: Vec<&Token> = vowels.iter().map(|t| t.as_ref()).collect();
        let compounds = cv::generate_cv(
            consonants.iter().map(|t| t.as_ref()),
            &vowel_refs,
            self.config.inherent_vowel,
        );

        let total = compounds.len();
        let mut created = 0;
        for token in compounds {
            if self.persist(token) {
                created += 1;
            }
        }

        tracing::info!(total, created, "generated consonant-vowel combinations");
        created
    }

    /// Expand `template` over the tokens of `source`
    ///
    /// The template is validated like any mapping. The result is meant to be
    /// passed to [`build`](Self::build) or [`build_tokens`](Self::build_tokens).
    pub fn combine(
        &mut self,
        source: &TokenSource,
        filter: TokenFilter,
        template: impl Into<SchemeValue>,
    ) -> Result<TokenMap, CompileError> {
        let template = validate(&template.into(), &mut self.context)?;

        let tokens: Vec<Rc<Token>> = match source {
            TokenSource::Category(TokenType::DeadConsonant) => {
                self.refresh_dead_consonants();
                self.cache.get(&TokenType::DeadConsonant).cloned().unwrap_or_default()
            }
            TokenSource::Category(token_type) => self.cache.get(token_type).cloned().unwrap_or_default(),
            TokenSource::List(name) => {
                if !self.lists.contains(name) {
                    return Err(self.abort(CompileError::UnknownList(name.clone())));
                }
                self.lists.get(name).map(|l| l.shared().to_vec()).unwrap_or_default()
            }
        };

        Ok(combine::combine(
            tokens.iter().map(|t| t.as_ref()).filter(|t| filter.matches(t)),
            &template,
        ))
    }

    // =========================================================================
    // Stemming
    // =========================================================================

    /// One stem rule per `old_ending => new_ending` pair
    pub fn stem_rules(&mut self, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        let map = validate(&mapping.into(), &mut self.context)?;
        for (old_ending, new_ending) in stem_pairs(&map, &mut self.context) {
            if let Err(e) = self.sink.create_stem_rule(&old_ending, &new_ending) {
                self.error_in(
                    DiagnosticCode::SinkRejected,
                    format!("{} => {}", old_ending, new_ending),
                    format!("could not create stem rule: {}", e),
                );
            }
        }
        Ok(())
    }

    /// One stem exception per `rule => exception` pair
    pub fn stem_exceptions(&mut self, mapping: impl Into<SchemeValue>) -> Result<(), CompileError> {
        let map = validate(&mapping.into(), &mut self.context)?;
        for (rule, exception) in stem_pairs(&map, &mut self.context) {
            if let Err(e) = self.sink.create_stem_exception(&rule, &exception) {
                self.error_in(
                    DiagnosticCode::SinkRejected,
                    format!("{} => {}", rule, exception),
                    format!("could not create stem exception: {}", e),
                );
            }
        }
        Ok(())
    }

    // =========================================================================
    // Sink options
    // =========================================================================

    pub fn infer_dead_consonants(&mut self, enabled: bool) {
        self.configure(SinkOption::InferDeadConsonants(enabled));
    }

    pub fn ignore_duplicates(&mut self, enabled: bool) {
        self.configure(SinkOption::IgnoreDuplicates(enabled));
    }

    fn configure(&mut self, option: SinkOption) {
        tracing::debug!(?option, "configuring sink");
        if let Err(e) = self.sink.configure(option) {
            self.context.error(DiagnosticCode::SinkRejected, e.to_string());
        }
    }

    // =========================================================================
    // Finishing
    // =========================================================================

    /// Inject default symbols, flush the sink and persist the scheme details
    ///
    /// Failures are recorded in the report, not returned.
    pub fn finish(&mut self) -> CompileOutcome {
        self.inject_defaults();

        if let Err(e) = self.sink.flush() {
            self.context.error(DiagnosticCode::SinkFailure, e.to_string());
        }

        self.details.compiled_date = chrono::Utc::now().to_rfc3339();
        if let Err(e) = self.sink.set_scheme_details(&self.details) {
            self.context.error(DiagnosticCode::SinkFailure, e.to_string());
        }

        let report = self.report();
        tracing::info!(
            tokens = report.summary.tokens_created,
            errors = report.summary.errors,
            warnings = report.summary.warnings,
            "compilation finished"
        );

        CompileOutcome {
            report,
            details: self.details.clone(),
        }
    }

    fn inject_defaults(&mut self) {
        let defaults = self.config.defaults.clone();
        if !defaults.enabled {
            return;
        }

        let single = |pattern: &str| -> TokenMap { std::iter::once((pattern, pattern)).collect() };

        if !self.overridden.contains(&TokenType::NonJoiner) {
            self.build_tokens(
                TokenType::NonJoiner,
                &single(&defaults.non_joiner),
                Priority::Normal,
                AcceptCondition::All,
            );
        }
        if !self.overridden.contains(&TokenType::Joiner) {
            self.build_tokens(
                TokenType::Joiner,
                &single(&defaults.joiner),
                Priority::Normal,
                AcceptCondition::All,
            );
        }
        self.build_tokens(
            TokenType::Symbol,
            &single(&defaults.separator),
            Priority::Normal,
            AcceptCondition::All,
        );
    }

    /// Report of everything recorded so far
    pub fn report(&self) -> Report {
        let mut report = Report::from_diagnostics(self.context.diagnostics().to_vec());
        report.summary.tokens_created = self.tokens_created;
        report.summary.schemes_compiled = 1;
        if !self.details.identifier.is_empty() {
            report.schemes.push(self.details.clone());
        }
        report
    }
}

/// Scalar `key => value` pairs of a stem mapping
fn stem_pairs(map: &TokenMap, ctx: &mut DiagnosticsContext) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map.iter() {
        match (key.as_scalar(), value.as_scalar()) {
            (Some(k), Some(v)) => pairs.push((k.to_string(), v.to_string())),
            _ => {
                ctx.set_expression(Some(format!("{} => {}", key, value)));
                ctx.error(
                    DiagnosticCode::ShapeInvalidType,
                    "Stem rules and exceptions take a single string on each side",
                );
                ctx.set_expression(None);
            }
        }
    }
    pairs
}
