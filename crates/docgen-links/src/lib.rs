//! Cross-link rewriting for rendered documentation.
//!
//! [`CrossLinker::rewrite`] post-processes HTML produced from doc strings,
//! module docs and notes. It links library notes, declaration names inside
//! code spans and highlighted name spans, and bibliography citations. Notes
//! and citations record backreferences in the [`RewriteContext`].
//!
//! Rewriting is a single application per text unit. Feeding rewritten output
//! back through the pipeline nests anchors.
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//!
//! use docgen_bib::Bibliography;
//! use docgen_links::{CrossLinker, NoteRegistry, Origin, RewriteContext};
//! use docgen_renderer::Linker;
//! use docgen_resolve::{Identifier, NameTable};
//!
//! let id = Identifier::new("mathlib", vec!["logic".to_owned()], PathBuf::from("/m/logic.lean"));
//! let mut names = NameTable::new();
//! names.insert("or.elim", &id);
//!
//! let notes = NoteRegistry::new([("case analysis".to_owned(), "...".to_owned())]);
//! let mut ctx = RewriteContext::new(notes, Bibliography::default());
//! ctx.set_origin(Origin::module(&id, "docgen_test"));
//!
//! let html = CrossLinker::new(Linker::new("/", &names))
//!     .rewrite("<p>By <code>or.elim</code>, see Note [case analysis].</p>", &mut ctx);
//! assert!(html.contains(r##"<a href="/logic.html#or.elim">or.elim</a>"##));
//! assert!(html.contains(r#"<a href="/notes.html#case%20analysis" id="backref_0">"#));
//! ```

mod context;
mod notes;
mod stages;

use docgen_renderer::Linker;

pub use context::{Origin, RewriteContext};
pub use notes::{NoteEntry, NoteRegistry, note_anchor};
pub use stages::Stage;

/// Runs an ordered pipeline of [`Stage`]s over rendered HTML.
#[derive(Clone, Debug)]
pub struct CrossLinker<'a> {
    linker: Linker<'a>,
    stages: Vec<Stage>,
}

impl<'a> CrossLinker<'a> {
    /// Rewriter running [`Stage::PIPELINE`].
    pub fn new(linker: Linker<'a>) -> Self {
        Self::with_stages(linker, Stage::PIPELINE)
    }

    /// Rewriter running `stages` in the given order.
    pub fn with_stages(linker: Linker<'a>, stages: impl Into<Vec<Stage>>) -> Self {
        Self {
            linker,
            stages: stages.into(),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn linker(&self) -> Linker<'a> {
        self.linker
    }

    /// Rewrite one unit of rendered HTML for the current origin of `ctx`.
    pub fn rewrite(&self, html: &str, ctx: &mut RewriteContext) -> String {
        let mut out = html.to_owned();
        for stage in &self.stages {
            out = stage.apply(&out, self.linker, ctx);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use docgen_bib::Bibliography;
    use docgen_renderer::render_markdown;
    use docgen_resolve::{Identifier, NameTable};
    use pretty_assertions::assert_eq;

    use super::*;

    fn group() -> Identifier {
        Identifier::new(
            "mathlib",
            vec!["algebra".to_owned(), "group".to_owned()],
            PathBuf::from("/m/src/algebra/group.lean"),
        )
    }

    fn names() -> NameTable {
        let mut names = NameTable::new();
        names.insert("foo.bar", &group());
        names.insert("foo.bar.one", &group());
        names
    }

    fn context() -> RewriteContext {
        let notes = NoteRegistry::new([
            ("continuity".to_owned(), "Why `continuity` works.".to_owned()),
            ("serre".to_owned(), "A note sharing a citation key.".to_owned()),
        ]);
        let bib = Bibliography::parse(
            "@book{serre, author = {Jean-Pierre Serre}, title = {Local fields}, year = 1979}\n\
             @article{smith2020, author = {John Smith}, title = {On groups}, year = 2020}",
        )
        .unwrap();
        let mut ctx = RewriteContext::new(notes, bib);
        ctx.set_origin(Origin::module(&group(), "docgen_test"));
        ctx
    }

    #[test]
    fn test_code_span_declaration_link() {
        let names = names();
        let html = render_markdown("`foo.bar`");
        let out = CrossLinker::new(Linker::new("/", &names)).rewrite(&html, &mut context());
        assert!(
            out.contains(r##"<code><a href="/algebra/group.html#foo.bar">foo.bar</a></code>"##),
            "{out}"
        );
    }

    #[test]
    fn test_code_span_tokens_keep_separators() {
        let names = names();
        let out = CrossLinker::new(Linker::new("/docs/", &names)).rewrite(
            "<code>(foo.bar x) [foo.bar.one]</code>",
            &mut context(),
        );
        assert_eq!(
            out,
            concat!(
                r##"<code>(<a href="/docs/algebra/group.html#foo.bar">foo.bar</a> x) "##,
                r##"[<a href="/docs/algebra/group.html#foo.bar.one">foo.bar.one</a>]</code>"##,
            )
        );
    }

    #[test]
    fn test_unknown_code_is_unchanged() {
        let names = names();
        let html = "<p><code>nat.succ_le_iff</code> and <code>a &lt; b</code></p>";
        let out = CrossLinker::new(Linker::new("/", &names)).rewrite(html, &mut context());
        assert_eq!(out, html);
    }

    #[test]
    fn test_name_spans() {
        let names = names();
        let out = CrossLinker::new(Linker::new("/", &names))
            .rewrite(r#"<span class="n">foo.bar</span>"#, &mut context());
        assert_eq!(
            out,
            r##"<span class="n"><a href="/algebra/group.html#foo.bar">foo.bar</a></span>"##
        );
    }

    #[test]
    fn test_note_link_registers_one_backref() {
        let names = names();
        let mut ctx = context();
        let out = CrossLinker::new(Linker::new("/", &names))
            .rewrite("<p>See note [continuity].</p>", &mut ctx);
        assert_eq!(
            out,
            r#"<p>See <a href="/notes.html#continuity" id="backref_0">note [continuity]</a>.</p>"#
        );
        let (notes, _) = ctx.into_parts();
        let backrefs = &notes.get("continuity").unwrap().backrefs;
        assert_eq!(backrefs.len(), 1);
        assert_eq!(backrefs[0].file, "algebra/group.html");
        assert_eq!(backrefs[0].anchor, "backref_0");
        assert_eq!(backrefs[0].title, "algebra.group");
    }

    #[test]
    fn test_note_title_stops_at_first_bracket() {
        let names = names();
        let out = CrossLinker::new(Linker::new("/", &names))
            .rewrite("Note [continuity] and [other]", &mut context());
        assert_eq!(
            out,
            r#"<a href="/notes.html#continuity" id="backref_0">Note [continuity]</a> and [other]"#
        );
    }

    #[test]
    fn test_unknown_note_links_without_backref() {
        let names = names();
        let mut ctx = context();
        let out = CrossLinker::new(Linker::new("/", &names))
            .rewrite("Note [no such note]", &mut ctx);
        assert_eq!(out, r#"<a href="/notes.html#no%20such%20note">Note [no such note]</a>"#);
    }

    #[test]
    fn test_test_project_links_without_backrefs() {
        let names = names();
        let mut ctx = context();
        let test_module = Identifier::new(
            "docgen_test",
            vec!["basic".to_owned()],
            PathBuf::from("/t/src/basic.lean"),
        );
        ctx.set_origin(Origin::module(&test_module, "docgen_test"));
        let out = CrossLinker::new(Linker::new("/", &names))
            .rewrite("Note [continuity] [serre]", &mut ctx);
        assert_eq!(
            out,
            concat!(
                r#"<a href="/notes.html#continuity">Note [continuity]</a> "#,
                r#"<a href="/references.html#serre">[Ser79]</a>"#,
            )
        );
        let (notes, bib) = ctx.into_parts();
        assert!(notes.get("continuity").unwrap().backrefs.is_empty());
        assert!(bib.get("serre").unwrap().backrefs.is_empty());
    }

    #[test]
    fn test_citations() {
        let names = names();
        let mut ctx = context();
        let out = CrossLinker::new(Linker::new("/", &names)).rewrite(
            "<p>By [smith2020], see [the book][serre] and [unknown].</p>",
            &mut ctx,
        );
        assert_eq!(
            out,
            concat!(
                r#"<p>By <a href="/references.html#smith2020" id="backref_0">[Smi20]</a>, "#,
                r#"see <a href="/references.html#serre" id="backref_1">the book</a> "#,
                "and [unknown].</p>",
            )
        );
        let bib = ctx.bibliography();
        assert_eq!(bib.get("smith2020").unwrap().backrefs[0].anchor, "backref_0");
        assert_eq!(bib.get("serre").unwrap().backrefs[0].anchor, "backref_1");
    }

    #[test]
    fn test_note_reference_is_not_a_citation() {
        let names = names();
        let mut ctx = context();
        let out = CrossLinker::new(Linker::new("/", &names)).rewrite("Note [serre]", &mut ctx);
        assert_eq!(out, r#"<a href="/notes.html#serre" id="backref_0">Note [serre]</a>"#);
        assert!(ctx.bibliography().get("serre").unwrap().backrefs.is_empty());
    }

    #[test]
    fn test_anchor_counter_spans_text_units() {
        let names = names();
        let linker = CrossLinker::new(Linker::new("/", &names));
        let mut ctx = context();
        linker.rewrite("Note [continuity]", &mut ctx);
        let out = linker.rewrite("[serre]", &mut ctx);
        assert_eq!(out, r#"<a href="/references.html#serre" id="backref_1">[Ser79]</a>"#);
    }

    #[test]
    fn test_custom_stage_order() {
        let names = names();
        let linker = CrossLinker::with_stages(Linker::new("/", &names), [Stage::Citations]);
        assert_eq!(linker.stages(), [Stage::Citations]);
        let out = linker.rewrite("<code>foo.bar</code> [serre]", &mut context());
        assert_eq!(
            out,
            r#"<code>foo.bar</code> <a href="/references.html#serre" id="backref_0">[Ser79]</a>"#
        );
    }

    #[test]
    fn test_plain_text_round_trip() {
        let names = NameTable::new();
        let html = "<p><code>plain_identifier</code> text</p>";
        let mut ctx = RewriteContext::new(NoteRegistry::default(), Bibliography::default());
        let out = CrossLinker::new(Linker::new("/", &names)).rewrite(html, &mut ctx);
        assert_eq!(out, html);
    }
}
