//! HTML rendering of content blocks.
//!
//! One dispatch serves every page context. A block whose primary fields are
//! all blank renders nothing, and so does a block of an unsupported type.

use std::fmt::{self, Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use super::content::*;
use super::document::{ContentBlock, ContentDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// Live preview in the admin editor. Video never autoplays.
    Preview,
    /// Public project and blog pages.
    Public,
}

impl RenderContext {
    fn section_class(self) -> &'static str {
        match self {
            Self::Preview => "block block-preview",
            Self::Public => "block",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Html(pub String);

impl Html {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Html {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the block has enough content to show anything.
pub fn is_present(content: &BlockContent) -> bool {
    match content {
        BlockContent::Text(c) => filled(&c.heading) || filled(&c.text),
        BlockContent::Image(c) => filled(&c.src),
        BlockContent::List(c) => filled(&c.title) || c.items.iter().any(|i| filled(i)),
        BlockContent::Quote(c) => filled(&c.text),
        BlockContent::Gallery(c) => filled(&c.title) || c.images.iter().any(|i| filled(i)),
        BlockContent::Video(c) => filled(&c.url),
        BlockContent::Testimonial(c) => filled(&c.name) || filled(&c.content),
        BlockContent::Stats(c) => filled(&c.title) || !c.stats.is_empty(),
        BlockContent::Timeline(c) => filled(&c.title) || !c.events.is_empty(),
        BlockContent::Faq(c) => filled(&c.title) || !c.questions.is_empty(),
        BlockContent::Cta(c) => filled(&c.title),
        BlockContent::File(c) => filled(&c.title) || filled(&c.file_url),
        BlockContent::Map(c) => filled(&c.title) || filled(&c.embed_url),
        BlockContent::Award(c) => filled(&c.title),
        BlockContent::Programme(c) => filled(&c.title) || !c.modules.is_empty(),
        BlockContent::Services(c) => filled(&c.title) || !c.categories.is_empty(),
        BlockContent::Sponsorship(c) => filled(&c.title) || !c.options.is_empty(),
        BlockContent::Impact(c) => filled(&c.title) || !c.impacts.is_empty(),
        BlockContent::Team(c) => filled(&c.title) || !c.members.is_empty(),
        BlockContent::Opaque(_) => false,
    }
}

/// Render one block, or `None` when it has nothing to show.
pub fn render(block: &ContentBlock, ctx: RenderContext) -> Option<Html> {
    if !is_present(&block.content) {
        return None;
    }
    Some(Html(BlockView { block, ctx }.to_string()))
}

/// Render every block in order. A block that panics while rendering is
/// dropped from the output; its siblings still render.
pub fn render_document(document: &ContentDocument, ctx: RenderContext) -> Html {
    let mut out = String::new();
    for block in document {
        match catch_unwind(AssertUnwindSafe(|| render(block, ctx))) {
            Ok(Some(html)) => out.push_str(&html.0),
            Ok(None) => {}
            Err(_) => tracing::error!(block_id = %block.id, "block failed to render"),
        }
    }
    Html(out)
}

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Escapes text for use in element content and quoted attributes.
pub struct Escaped<'a>(pub &'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for (i, c) in self.0.char_indices() {
            let entity = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            f.write_str(&self.0[last..i])?;
            f.write_str(entity)?;
            last = i + c.len_utf8();
        }
        f.write_str(&self.0[last..])
    }
}

/// Escaped URL, blanked when it uses a scheme that can run script.
pub struct SafeUrl<'a>(pub &'a str);

impl Display for SafeUrl<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let lowered = self.0.trim_start().to_ascii_lowercase();
        if lowered.starts_with("javascript:") || lowered.starts_with("vbscript:") {
            return Ok(());
        }
        Escaped(self.0.trim()).fmt(f)
    }
}

/// Paragraphs split on blank lines, single newlines kept as `<br>`.
struct Paragraphs<'a>(&'a str);

impl Display for Paragraphs<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for para in self.0.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            f.write_str("<p>")?;
            for (i, line) in para.lines().enumerate() {
                if i > 0 {
                    f.write_str("<br>")?;
                }
                Escaped(line).fmt(f)?;
            }
            f.write_str("</p>")?;
        }
        Ok(())
    }
}

struct BlockView<'a> {
    block: &'a ContentBlock,
    ctx: RenderContext,
}

impl Display for BlockView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let content = &self.block.content;
        write!(
            f,
            r#"<section class="{} block-{}" data-block-id="{}">"#,
            self.ctx.section_class(),
            Escaped(content.type_tag()),
            Escaped(self.block.id.as_str()),
        )?;
        match content {
            BlockContent::Text(c) => text(f, c)?,
            BlockContent::Image(c) => image(f, c)?,
            BlockContent::List(c) => list(f, c)?,
            BlockContent::Quote(c) => quote(f, c)?,
            BlockContent::Gallery(c) => gallery(f, c)?,
            BlockContent::Video(c) => video(f, c, self.ctx)?,
            BlockContent::Testimonial(c) => testimonial(f, c)?,
            BlockContent::Stats(c) => stats(f, c)?,
            BlockContent::Timeline(c) => timeline(f, c)?,
            BlockContent::Faq(c) => faq(f, c)?,
            BlockContent::Cta(c) => cta(f, c)?,
            BlockContent::File(c) => file(f, c)?,
            BlockContent::Map(c) => map(f, c)?,
            BlockContent::Award(c) => award(f, c)?,
            BlockContent::Programme(c) => programme(f, c)?,
            BlockContent::Services(c) => services(f, c)?,
            BlockContent::Sponsorship(c) => sponsorship(f, c)?,
            BlockContent::Impact(c) => impact(f, c)?,
            BlockContent::Team(c) => team(f, c)?,
            BlockContent::Opaque(_) => {}
        }
        f.write_str("</section>")
    }
}

fn heading(f: &mut Formatter<'_>, level: u8, text: &str) -> fmt::Result {
    if filled(text) {
        write!(f, "<h{level}>{}</h{level}>", Escaped(text))?;
    }
    Ok(())
}

fn para(f: &mut Formatter<'_>, class: &str, text: &str) -> fmt::Result {
    if filled(text) {
        write!(f, r#"<p class="{class}">{}</p>"#, Escaped(text))?;
    }
    Ok(())
}

fn text(f: &mut Formatter<'_>, c: &TextContent) -> fmt::Result {
    heading(f, 2, &c.heading)?;
    Paragraphs(&c.text).fmt(f)
}

fn image(f: &mut Formatter<'_>, c: &ImageContent) -> fmt::Result {
    write!(
        f,
        r#"<figure><img src="{}" alt="{}" loading="lazy">"#,
        SafeUrl(&c.src),
        Escaped(&c.alt)
    )?;
    if filled(&c.caption) {
        write!(f, "<figcaption>{}</figcaption>", Escaped(&c.caption))?;
    }
    f.write_str("</figure>")
}

fn list(f: &mut Formatter<'_>, c: &ListContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    let mut items = c.items.iter().filter(|i| filled(i)).peekable();
    if items.peek().is_some() {
        f.write_str("<ul>")?;
        for item in items {
            write!(f, "<li>{}</li>", Escaped(item))?;
        }
        f.write_str("</ul>")?;
    }
    Ok(())
}

fn quote(f: &mut Formatter<'_>, c: &QuoteContent) -> fmt::Result {
    write!(f, "<blockquote><p>{}</p>", Escaped(&c.text))?;
    if filled(&c.author) {
        write!(f, "<footer><cite>{}</cite></footer>", Escaped(&c.author))?;
    }
    f.write_str("</blockquote>")
}

fn gallery(f: &mut Formatter<'_>, c: &GalleryContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    f.write_str(r#"<div class="gallery">"#)?;
    for (i, src) in c.images.iter().filter(|s| filled(s)).enumerate() {
        write!(
            f,
            r#"<img src="{}" alt="{} {}" loading="lazy">"#,
            SafeUrl(src),
            Escaped(if filled(&c.title) { c.title.as_str() } else { "Image" }),
            i + 1
        )?;
    }
    f.write_str("</div>")
}

/// Embed URL for the video hosts we know, `None` for a direct media file.
pub fn video_embed_url(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);

    let youtube_id = if let Some(query) = rest.strip_prefix("youtube.com/watch?") {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))
            .map(str::to_string)
    } else if let Some(id) = rest.strip_prefix("youtu.be/") {
        Some(id.split(['?', '&', '/']).next().unwrap_or_default().to_string())
    } else if rest.starts_with("youtube.com/embed/") {
        return Some(url.to_string());
    } else {
        None
    };
    if let Some(id) = youtube_id.filter(|id| !id.is_empty()) {
        return Some(format!("https://www.youtube.com/embed/{id}"));
    }

    if rest.starts_with("player.vimeo.com/video/") {
        return Some(url.to_string());
    }
    if let Some(id) = rest.strip_prefix("vimeo.com/") {
        let id = id.split(['?', '/']).next().unwrap_or_default();
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
            return Some(format!("https://player.vimeo.com/video/{id}"));
        }
    }
    None
}

fn video(f: &mut Formatter<'_>, c: &VideoContent, ctx: RenderContext) -> fmt::Result {
    heading(f, 3, &c.title)?;
    let autoplay = c.autoplay && ctx == RenderContext::Public;
    match video_embed_url(&c.url) {
        Some(embed) => {
            let sep = if embed.contains('?') { '&' } else { '?' };
            write!(
                f,
                r#"<div class="video-embed"><iframe src="{}{sep}autoplay={}&controls={}" title="{}" allow="autoplay; encrypted-media; fullscreen" allowfullscreen></iframe></div>"#,
                SafeUrl(&embed),
                u8::from(autoplay),
                u8::from(c.show_controls),
                Escaped(if filled(&c.title) { c.title.as_str() } else { "Video" }),
            )?;
        }
        None => {
            write!(f, r#"<video src="{}""#, SafeUrl(&c.url))?;
            if c.show_controls {
                f.write_str(" controls")?;
            }
            if autoplay {
                f.write_str(" autoplay muted playsinline")?;
            }
            f.write_str("></video>")?;
        }
    }
    para(f, "description", &c.description)
}

fn testimonial(f: &mut Formatter<'_>, c: &TestimonialContent) -> fmt::Result {
    f.write_str(r#"<figure class="testimonial">"#)?;
    if filled(&c.image) {
        write!(
            f,
            r#"<img src="{}" alt="{}" loading="lazy">"#,
            SafeUrl(&c.image),
            Escaped(&c.name)
        )?;
    }
    if filled(&c.content) {
        write!(f, "<blockquote>{}</blockquote>", Paragraphs(&c.content))?;
    }
    f.write_str("<figcaption>")?;
    if filled(&c.name) {
        write!(f, "<strong>{}</strong>", Escaped(&c.name))?;
    }
    if filled(&c.role) {
        write!(f, "<span>{}</span>", Escaped(&c.role))?;
    }
    f.write_str("</figcaption></figure>")
}

fn stats(f: &mut Formatter<'_>, c: &StatsContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    if !c.stats.is_empty() {
        f.write_str(r#"<dl class="stats">"#)?;
        for stat in &c.stats {
            write!(
                f,
                "<div><dt>{}</dt><dd>{}</dd></div>",
                Escaped(&stat.label),
                Escaped(&stat.value)
            )?;
        }
        f.write_str("</dl>")?;
    }
    Ok(())
}

fn timeline(f: &mut Formatter<'_>, c: &TimelineContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    if !c.events.is_empty() {
        f.write_str(r#"<ol class="timeline">"#)?;
        for event in &c.events {
            write!(f, r#"<li><span class="year">{}</span>"#, Escaped(&event.year))?;
            heading(f, 4, &event.title)?;
            para(f, "description", &event.description)?;
            f.write_str("</li>")?;
        }
        f.write_str("</ol>")?;
    }
    Ok(())
}

fn faq(f: &mut Formatter<'_>, c: &FaqContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    for item in &c.questions {
        write!(
            f,
            "<details><summary>{}</summary>{}</details>",
            Escaped(&item.question),
            Paragraphs(&item.answer)
        )?;
    }
    Ok(())
}

fn cta(f: &mut Formatter<'_>, c: &CtaContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    para(f, "description", &c.description)?;
    if filled(&c.button_text) && filled(&c.button_url) {
        write!(
            f,
            r#"<a class="button" href="{}">{}</a>"#,
            SafeUrl(&c.button_url),
            Escaped(&c.button_text)
        )?;
    }
    Ok(())
}

fn file(f: &mut Formatter<'_>, c: &FileContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    para(f, "description", &c.description)?;
    if filled(&c.file_url) {
        let label = if filled(&c.file_name) {
            c.file_name.as_str()
        } else if filled(&c.title) {
            c.title.as_str()
        } else {
            "Download"
        };
        write!(
            f,
            r#"<a class="download" href="{}" download="{}">{}</a>"#,
            SafeUrl(&c.file_url),
            Escaped(&c.file_name),
            Escaped(label)
        )?;
    }
    Ok(())
}

fn map(f: &mut Formatter<'_>, c: &MapContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    if filled(&c.address) {
        write!(f, "<address>{}</address>", Escaped(&c.address))?;
    }
    if filled(&c.embed_url) {
        write!(
            f,
            r#"<iframe class="map" src="{}" title="{}" loading="lazy"></iframe>"#,
            SafeUrl(&c.embed_url),
            Escaped(if filled(&c.title) { c.title.as_str() } else { "Map" })
        )?;
    }
    Ok(())
}

fn award(f: &mut Formatter<'_>, c: &AwardContent) -> fmt::Result {
    if filled(&c.image) {
        write!(
            f,
            r#"<img src="{}" alt="{}" loading="lazy">"#,
            SafeUrl(&c.image),
            Escaped(&c.title)
        )?;
    }
    heading(f, 3, &c.title)?;
    match (filled(&c.issuer), filled(&c.year)) {
        (true, true) => write!(
            f,
            r#"<p class="issuer">{}, {}</p>"#,
            Escaped(&c.issuer),
            Escaped(&c.year)
        )?,
        (true, false) => para(f, "issuer", &c.issuer)?,
        (false, true) => para(f, "issuer", &c.year)?,
        (false, false) => {}
    }
    para(f, "description", &c.description)
}

fn programme(f: &mut Formatter<'_>, c: &ProgrammeContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    para(f, "duration", &c.duration)?;
    if !c.modules.is_empty() {
        f.write_str(r#"<ol class="modules">"#)?;
        for module in &c.modules {
            f.write_str("<li>")?;
            heading(f, 4, &module.title)?;
            para(f, "duration", &module.duration)?;
            para(f, "description", &module.description)?;
            f.write_str("</li>")?;
        }
        f.write_str("</ol>")?;
    }
    para(f, "certification", &c.certification)
}

fn services(f: &mut Formatter<'_>, c: &ServicesContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    for category in &c.categories {
        f.write_str(r#"<div class="service-category">"#)?;
        heading(f, 4, &category.name)?;
        if !category.services.is_empty() {
            f.write_str("<ul>")?;
            for service in &category.services {
                write!(f, "<li><strong>{}</strong>", Escaped(&service.name))?;
                para(f, "description", &service.description)?;
                f.write_str("</li>")?;
            }
            f.write_str("</ul>")?;
        }
        f.write_str("</div>")?;
    }
    Ok(())
}

fn sponsorship(f: &mut Formatter<'_>, c: &SponsorshipContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    for option in &c.options {
        f.write_str(r#"<article class="sponsorship-option">"#)?;
        heading(f, 4, &option.name)?;
        para(f, "description", &option.description)?;
        let mut benefits = option.benefits.iter().filter(|b| filled(b)).peekable();
        if benefits.peek().is_some() {
            f.write_str("<ul>")?;
            for benefit in benefits {
                write!(f, "<li>{}</li>", Escaped(benefit))?;
            }
            f.write_str("</ul>")?;
        }
        f.write_str("</article>")?;
    }
    Ok(())
}

fn impact(f: &mut Formatter<'_>, c: &ImpactContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    if !c.impacts.is_empty() {
        f.write_str(r#"<div class="impacts">"#)?;
        for item in &c.impacts {
            write!(
                f,
                "<div><strong>{}</strong><p>{}</p></div>",
                Escaped(&item.value),
                Escaped(&item.description)
            )?;
        }
        f.write_str("</div>")?;
    }
    let mut sdgs = c.sdgs.iter().filter(|s| filled(s)).peekable();
    if sdgs.peek().is_some() {
        f.write_str(r#"<ul class="sdgs">"#)?;
        for sdg in sdgs {
            write!(f, "<li>{}</li>", Escaped(sdg))?;
        }
        f.write_str("</ul>")?;
    }
    Ok(())
}

fn team(f: &mut Formatter<'_>, c: &TeamContent) -> fmt::Result {
    heading(f, 3, &c.title)?;
    for member in &c.members {
        f.write_str(r#"<article class="team-member">"#)?;
        heading(f, 4, &member.role)?;
        let mut duties = member.responsibilities.iter().filter(|r| filled(r)).peekable();
        if duties.peek().is_some() {
            f.write_str("<ul>")?;
            for duty in duties {
                write!(f, "<li>{}</li>", Escaped(duty))?;
            }
            f.write_str("</ul>")?;
        }
        f.write_str("</article>")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockType, ContentBlock};
    use serde_json::{json, Value};

    fn block(ty: &str, content: Value) -> ContentBlock {
        ContentBlock::from_value(json!({ "id": "b1", "type": ty, "content": content })).unwrap()
    }

    #[test]
    fn default_content_never_panics() {
        for ty in BlockType::palette() {
            for ctx in [RenderContext::Preview, RenderContext::Public] {
                let _ = render(&ContentBlock::new(ty), ctx);
            }
        }
    }

    #[test]
    fn empty_primary_fields_render_nothing() {
        for ty in BlockType::palette() {
            let html = render(&ContentBlock::new(ty), RenderContext::Public);
            assert!(html.is_none(), "{ty} default rendered {html:?}");
        }
    }

    #[test]
    fn one_primary_field_is_enough() {
        let cases = [
            block("text", json!({ "heading": "Intro" })),
            block("text", json!({ "text": "Body only" })),
            block("image", json!({ "src": "/a.png" })),
            block("list", json!({ "items": ["", "x"] })),
            block("list", json!({ "title": "Goals", "items": [] })),
            block("quote", json!({ "text": "Be the change" })),
            block("gallery", json!({ "title": "Photos" })),
            block("gallery", json!({ "images": ["/1.jpg"] })),
            block("video", json!({ "url": "https://youtu.be/abc" })),
            block("testimonial", json!({ "content": "Great" })),
            block("stats", json!({ "stats": [{ "label": "Wells", "value": "12" }] })),
            block("stats", json!({ "title": "Numbers" })),
            block("timeline", json!({ "events": [{ "year": "2020" }] })),
            block("faq", json!({ "questions": [{ "question": "Why?" }] })),
            block("cta", json!({ "title": "Donate" })),
            block("file", json!({ "fileUrl": "/report.pdf" })),
            block("map", json!({ "embedUrl": "https://maps.test/embed" })),
            block("award", json!({ "title": "Best NGO" })),
            block("programme", json!({ "modules": [{ "title": "Intro" }] })),
            block("services", json!({ "categories": [{ "name": "Health" }] })),
            block("sponsorship", json!({ "title": "Sponsor a child" })),
            block("impact", json!({ "impacts": [{ "value": "3k" }] })),
            block("team", json!({ "members": [{ "role": "Lead" }] })),
        ];
        for case in &cases {
            assert!(
                render(case, RenderContext::Public).is_some(),
                "{} did not render",
                case.content.type_tag()
            );
        }
    }

    #[test]
    fn quote_needs_text_not_author() {
        assert!(render(&block("quote", json!({ "author": "Anon" })), RenderContext::Public).is_none());
    }

    #[test]
    fn unknown_type_renders_nothing_but_siblings_do() {
        let document: ContentDocument = serde_json::from_value(json!([
            { "id": "1", "type": "text", "content": { "heading": "Before" } },
            { "id": "2", "type": "unsupported-future-type", "content": { "x": 1 } },
            { "id": "3", "type": "quote", "content": { "text": "After" } },
        ]))
        .unwrap();

        assert!(render(&document.blocks()[1], RenderContext::Public).is_none());
        let html = render_document(&document, RenderContext::Public);
        assert!(html.as_str().contains("Before"));
        assert!(html.as_str().contains("After"));
        assert!(!html.as_str().contains("data-block-id=\"2\""));
    }

    #[test]
    fn text_is_escaped() {
        let html = render(
            &block("text", json!({ "heading": "<script>", "text": "a & b\n\nc\nd" })),
            RenderContext::Public,
        )
        .unwrap();
        assert!(html.as_str().contains("<h2>&lt;script&gt;</h2>"));
        assert!(html.as_str().contains("<p>a &amp; b</p><p>c<br>d</p>"));
    }

    #[test]
    fn script_urls_are_dropped() {
        let html = render(
            &block("cta", json!({ "title": "x", "buttonText": "go", "buttonUrl": "javascript:alert(1)" })),
            RenderContext::Public,
        )
        .unwrap();
        assert!(html.as_str().contains(r#"href="""#));
    }

    #[test]
    fn preview_never_autoplays() {
        let video = block(
            "video",
            json!({ "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=3", "autoplay": true }),
        );
        let public = render(&video, RenderContext::Public).unwrap();
        let preview = render(&video, RenderContext::Preview).unwrap();
        assert!(public.as_str().contains("youtube.com/embed/dQw4w9WgXcQ?autoplay=1"));
        assert!(preview.as_str().contains("autoplay=0"));
        assert!(preview.as_str().contains("block-preview"));
    }

    #[test]
    fn embed_urls() {
        assert_eq!(
            video_embed_url("https://youtu.be/abc123?t=4").as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
        assert_eq!(
            video_embed_url("https://vimeo.com/76979871").as_deref(),
            Some("https://player.vimeo.com/video/76979871")
        );
        assert_eq!(video_embed_url("https://cdn.test/clip.mp4"), None);

        let html = render(&block("video", json!({ "url": "/clip.mp4" })), RenderContext::Public).unwrap();
        assert!(html.as_str().contains(r#"<video src="/clip.mp4" controls></video>"#));
    }

    #[test]
    fn nested_groups_render_in_order() {
        let html = render(
            &block(
                "sponsorship",
                json!({
                    "title": "Ways to help",
                    "options": [
                        { "name": "Bronze", "benefits": ["Newsletter", ""] },
                        { "name": "Gold", "benefits": ["Site visit"] },
                    ],
                }),
            ),
            RenderContext::Public,
        )
        .unwrap();
        let s = html.as_str();
        let bronze = s.find("Bronze").unwrap();
        let gold = s.find("Gold").unwrap();
        assert!(bronze < gold);
        assert!(s.contains("<li>Newsletter</li>"));
        assert!(!s.contains("<li></li>"));
    }
}
