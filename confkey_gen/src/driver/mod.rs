//! Generation rounds.
//!
//! A round walks the matched declarations, builds a request and a property
//! map for each, then renders and emits its artifacts. Failures stay inside
//! the declaration that caused them: they become error diagnostics and the
//! round moves on.

use std::io::Write;

use crate::diagnostics::DiagnosticSink;
use crate::emit::Filer;
use crate::error::{ErrorCategory, GenerationError};
use crate::model::{CONFIGURATION, Declaration};
use crate::properties::PropertyMap;
use crate::render::TemplateRenderer;
use crate::request::{Artifact, ArtifactKind, FeatureSet, GenerationRequest};

/// Reported under `Minimal` when a round matches several declarations.
pub const MULTIPLE_DECLARATIONS: &str = "more than one element per type ConfigurationKey";

/// Collaborators a round runs against.
pub struct Session<'a> {
    /// Renders artifact templates.
    pub renderer: &'a dyn TemplateRenderer,
    /// Creates output files.
    pub filer: &'a mut dyn Filer,
    /// Receives notes and errors.
    pub sink: &'a mut dyn DiagnosticSink,
}

/// Result of processing one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationOutcome {
    /// Qualified name of the declaration.
    pub declaration: String,
    /// Qualified names of the artifacts emitted, in order.
    pub emitted: Vec<String>,
    /// Category of the failure that stopped generation, if any.
    pub failure: Option<ErrorCategory>,
}

impl DeclarationOutcome {
    /// Reports whether every artifact was emitted.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Per-declaration outcomes in processing order.
    pub declarations: Vec<DeclarationOutcome>,
    /// Failures attached to the round rather than to a declaration.
    pub round_failures: Vec<ErrorCategory>,
}

impl RoundOutcome {
    /// Whether the round claimed its annotations. Always `true`.
    #[must_use]
    pub const fn consumed(&self) -> bool {
        true
    }

    /// Reports whether anything failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.round_failures.is_empty()
            || self.declarations.iter().any(|outcome| !outcome.succeeded())
    }

    /// Qualified names of every emitted artifact, in order.
    pub fn emitted(&self) -> impl Iterator<Item = &str> {
        self.declarations
            .iter()
            .flat_map(|outcome| outcome.emitted.iter().map(String::as_str))
    }
}

/// Runs generation rounds under a feature set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigurationGenerator {
    features: FeatureSet,
}

impl ConfigurationGenerator {
    /// Creates a generator for `features`.
    #[must_use]
    pub const fn new(features: FeatureSet) -> Self {
        Self { features }
    }

    /// Feature set rounds run under.
    #[must_use]
    pub const fn features(&self) -> FeatureSet {
        self.features
    }

    /// Processes every declaration carrying `#[configuration]`.
    ///
    /// Never fails: problems are reported to the session's sink and
    /// recorded in the outcome.
    pub fn process(&self, declarations: &[Declaration], session: &mut Session<'_>) -> RoundOutcome {
        let matched: Vec<&Declaration> = declarations
            .iter()
            .filter(|declaration| declaration.is_annotated_with(CONFIGURATION))
            .collect();
        let _round = tracing::info_span!(
            "configuration_round",
            features = ?self.features,
            declarations = matched.len()
        )
        .entered();

        let names: Vec<String> = matched
            .iter()
            .map(|declaration| declaration.qualify(&declaration.name))
            .collect();
        session.sink.note(
            &format!("Called processing on elements: [{}]", names.join(", ")),
            None,
        );

        let mut outcome = RoundOutcome::default();
        if self.features.capabilities().single_declaration && matched.len() > 1 {
            session.sink.error(MULTIPLE_DECLARATIONS, None);
            outcome.round_failures.push(ErrorCategory::Multiplicity);
        }

        for (declaration, name) in matched.into_iter().zip(names) {
            let _declaration = tracing::info_span!("declaration", name = %name).entered();
            let mut emitted = Vec::new();
            let failure = match self.generate(declaration, session, &mut emitted) {
                Ok(()) => None,
                Err(err) => {
                    session.sink.error(&err.diagnostic_message(), Some(declaration));
                    Some(err.category())
                }
            };
            outcome.declarations.push(DeclarationOutcome {
                declaration: name,
                emitted,
                failure,
            });
        }
        outcome
    }

    fn generate(
        &self,
        declaration: &Declaration,
        session: &mut Session<'_>,
        emitted: &mut Vec<String>,
    ) -> Result<(), GenerationError> {
        let request = GenerationRequest::from_declaration(declaration, self.features)?;
        describe(&request, declaration, session.sink);
        let map = PropertyMap::from_request(&request);

        for artifact in request.artifacts() {
            session.sink.note(
                &format!("Generating {}: {}", artifact_label(&artifact), artifact.qualified_name),
                Some(declaration),
            );
            emit(&artifact, &map, declaration, session)?;
            emitted.push(artifact.qualified_name);
        }
        Ok(())
    }
}

fn describe(request: &GenerationRequest, declaration: &Declaration, sink: &mut dyn DiagnosticSink) {
    let mut note = |message: String| sink.note(&message, Some(declaration));
    note("Gathering information for code generation".to_owned());
    note(format!(
        "Type prefix for generated types will be \"{}\"",
        request.enum_name
    ));
    note(format!(
        "Will {}generate producers for primitive types",
        if request.producers_for_primitives { "" } else { "not " }
    ));
    note(format!("Annotation will be named {}", request.annotation_name));
    note(format!(
        "Configuration bean will be named {}",
        request.configuration_bean_name
    ));
    note(format!(
        "Generated configuration bean will have the following annotations: [{}]",
        request.passed_annotations.join(", ")
    ));
    note(format!(
        "All generated code will be under the \"{}\" module",
        request.namespace
    ));
    if let Some(validator) = &request.validator {
        note(format!(
            "Values will be validated by the predicate returned from the {validator} method of the enum"
        ));
    }
    if let (true, Some(path), Some(variable)) = (
        request.generate_resolver,
        &request.properties_path,
        &request.system_property_name,
    ) {
        note(format!(
            "A property-file based resolver will be generated, reading properties from {path} and customizable from environment variable {variable}"
        ));
    }
    if let Some(key_string) = &request.key_string {
        note(format!(
            "The key string for properties will be the one from the {key_string} method of the enum"
        ));
    }
    note(format!(
        "The default key for the generated annotation will be \"{}\"",
        request.default_key
    ));
}

const fn artifact_label(artifact: &Artifact) -> &'static str {
    match artifact.kind {
        ArtifactKind::Annotation => "configuration annotation",
        ArtifactKind::Bean => "configuration bean",
        ArtifactKind::Resolver => "property file based configuration resolver",
    }
}

fn emit(
    artifact: &Artifact,
    map: &PropertyMap,
    declaration: &Declaration,
    session: &mut Session<'_>,
) -> Result<(), GenerationError> {
    let template = artifact.kind.template();
    let text = session
        .renderer
        .render(template, map)
        .map_err(|err| err.into_generation_error(template))?;
    let emission = |source| GenerationError::Emission {
        qualified_name: artifact.qualified_name.clone(),
        source,
    };
    let mut writer = session
        .filer
        .create_source_file(&artifact.qualified_name, declaration)
        .map_err(emission)?;
    writer.write_all(text.as_bytes()).map_err(emission)?;
    writer.flush().map_err(emission)?;
    Ok(())
}
