//! ArchiveService - the main entry point for compiling posts.

use tumblrite_core::{Diagnostic, Diagnostics, MarkupNode, Options, PostRecord};

use crate::compose::PostComposer;
use crate::{Result, TumblriteError};

/// One compiled post and what was substituted while compiling it
#[derive(Debug, Clone)]
pub struct RenderedPost {
    pub node: MarkupNode,
    pub diagnostics: Vec<Diagnostic>,
}

/// Posts compiled before a batch stopped on an error
#[derive(Debug)]
pub struct PartialRender {
    /// Every post completed before the failure, in input order
    pub rendered: Vec<RenderedPost>,
    /// Id of the post that failed
    pub post_id: String,
    pub error: TumblriteError,
}

/// The main service for compiling posts into markup
#[derive(Debug, Clone, Default)]
pub struct ArchiveService {
    options: Options,
}

impl ArchiveService {
    /// Create a new ArchiveService with default options
    pub fn new() -> Self {
        Self {
            options: Options::default(),
        }
    }

    /// Create an ArchiveService with custom options
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Compile one post and its reblog trail
    pub fn render_post(&self, post: &PostRecord) -> Result<RenderedPost> {
        let mut diagnostics = Diagnostics::new();
        let node = PostComposer::new(&self.options).compose(post, &mut diagnostics)?;
        log::debug!(
            "Rendered post {} ({} ancestor(s), {} diagnostic(s))",
            post.id,
            post.trail.len(),
            diagnostics.len()
        );

        Ok(RenderedPost {
            node,
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// Compile posts in order, stopping at the first failure.
    ///
    /// On failure the posts rendered so far are handed back with the error.
    pub fn render_posts<'p, I>(
        &self,
        posts: I,
    ) -> std::result::Result<Vec<RenderedPost>, PartialRender>
    where
        I: IntoIterator<Item = &'p PostRecord>,
    {
        let mut rendered = Vec::new();

        for post in posts {
            match self.render_post(post) {
                Ok(post) => rendered.push(post),
                Err(error) => {
                    return Err(PartialRender {
                        rendered,
                        post_id: post.id.clone(),
                        error,
                    });
                }
            }
        }

        Ok(rendered)
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }
}
