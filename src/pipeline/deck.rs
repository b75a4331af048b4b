//! Slide deck assembly: one borderless, full-bleed image slide per page.
//!
//! ## Why hand-rolled OOXML?
//!
//! A `.pptx` file is a zip package of XML parts. The deck this service
//! produces is deliberately minimal — a blank master/layout pair, one theme,
//! and N picture slides — so the package is written directly with the `zip`
//! crate from fixed templates rather than through a document-object model.
//! The templates carry exactly the parts PowerPoint and LibreOffice require
//! to open the file: content types, package relationships, the presentation
//! part with the slide size, a slide master chain, and per-slide parts
//! embedding the page images.
//!
//! Every slide places its image at the origin spanning the full canvas, so
//! later pages are stretched to the first page's canvas (see
//! [`crate::pipeline::geometry`] for why that is preserved behaviour).

use crate::error::Pdf2DeckError;
use crate::pipeline::geometry::SlideCanvas;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds a presentation document, one image slide at a time, then writes
/// the whole package with [`DeckBuilder::save`].
#[derive(Debug)]
pub struct DeckBuilder {
    canvas: SlideCanvas,
    slides: Vec<PathBuf>,
}

impl DeckBuilder {
    /// Start an empty deck sized to `canvas`.
    pub fn new(canvas: SlideCanvas) -> Self {
        Self {
            canvas,
            slides: Vec::new(),
        }
    }

    /// Append one slide holding the image at `image_path`, placed at the
    /// origin and spanning the full canvas. Returns the slide's 1-based
    /// ordinal. The file is read at [`DeckBuilder::save`] time.
    pub fn add_image_slide(&mut self, image_path: impl Into<PathBuf>) -> usize {
        self.slides.push(image_path.into());
        self.slides.len()
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn canvas(&self) -> SlideCanvas {
        self.canvas
    }

    /// Write the `.pptx` package to `output`. Returns the package byte size.
    pub fn save(&self, output: &Path) -> Result<u64, Pdf2DeckError> {
        let persist = |source: std::io::Error| Pdf2DeckError::OutputWriteFailed {
            path: output.to_path_buf(),
            source,
        };

        let file = std::fs::File::create(output).map_err(persist)?;
        let mut zip = ZipWriter::new(file);
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let n = self.slides.len();
        write_part(&mut zip, opts, "[Content_Types].xml", &content_types(n)).map_err(persist)?;
        write_part(&mut zip, opts, "_rels/.rels", ROOT_RELS).map_err(persist)?;
        write_part(
            &mut zip,
            opts,
            "ppt/presentation.xml",
            &presentation_xml(&self.canvas, n),
        )
        .map_err(persist)?;
        write_part(
            &mut zip,
            opts,
            "ppt/_rels/presentation.xml.rels",
            &presentation_rels(n),
        )
        .map_err(persist)?;
        write_part(
            &mut zip,
            opts,
            "ppt/slideMasters/slideMaster1.xml",
            SLIDE_MASTER,
        )
        .map_err(persist)?;
        write_part(
            &mut zip,
            opts,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS,
        )
        .map_err(persist)?;
        write_part(
            &mut zip,
            opts,
            "ppt/slideLayouts/slideLayout1.xml",
            SLIDE_LAYOUT,
        )
        .map_err(persist)?;
        write_part(
            &mut zip,
            opts,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS,
        )
        .map_err(persist)?;
        write_part(&mut zip, opts, "ppt/theme/theme1.xml", THEME).map_err(persist)?;

        for (i, image_path) in self.slides.iter().enumerate() {
            let ordinal = i + 1;

            let image_bytes =
                std::fs::read(image_path).map_err(|e| Pdf2DeckError::SlideAssemblyFailed {
                    page: ordinal,
                    detail: format!("cannot read '{}': {e}", image_path.display()),
                })?;

            write_part(
                &mut zip,
                opts,
                &format!("ppt/slides/slide{ordinal}.xml"),
                &slide_xml(ordinal, &self.canvas),
            )
            .map_err(persist)?;
            write_part(
                &mut zip,
                opts,
                &format!("ppt/slides/_rels/slide{ordinal}.xml.rels"),
                &slide_rels(ordinal),
            )
            .map_err(persist)?;

            zip.start_file(format!("ppt/media/image{ordinal}.png"), opts)
                .map_err(|e| persist(std::io::Error::other(e)))?;
            zip.write_all(&image_bytes).map_err(persist)?;
        }

        zip.finish().map_err(|e| persist(std::io::Error::other(e)))?;

        let bytes = std::fs::metadata(output).map_err(persist)?.len();
        debug!(
            "Wrote {} ({} slides, {} bytes)",
            output.display(),
            n,
            bytes
        );
        Ok(bytes)
    }
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    opts: SimpleFileOptions,
    name: &str,
    body: &str,
) -> std::io::Result<()> {
    zip.start_file(name, opts).map_err(std::io::Error::other)?;
    zip.write_all(body.as_bytes())
}

// ── Package part templates ───────────────────────────────────────────────

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn content_types(slide_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=slide_count {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{overrides}</Types>"#
    )
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

fn presentation_xml(canvas: &SlideCanvas, slide_count: usize) -> String {
    let cx = canvas.width_emu();
    let cy = canvas.height_emu();
    let mut slide_ids = String::new();
    for i in 1..=slide_count {
        // Slide part ids start at 256 by convention; rId1 is the master.
        let id = 255 + i;
        let rid = i + 1;
        slide_ids.push_str(&format!(r#"<p:sldId id="{id}" r:id="rId{rid}"/>"#));
    }
    format!(
        r#"{XML_DECL}
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="{cx}" cy="{cy}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
    );
    for i in 1..=slide_count {
        let rid = i + 1;
        rels.push_str(&format!(
            r#"<Relationship Id="rId{rid}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#
        ));
    }
    format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    )
}

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="FFFFFF"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;

const SLIDE_MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const SLIDE_LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

fn slide_xml(ordinal: usize, canvas: &SlideCanvas) -> String {
    let cx = canvas.width_emu();
    let cy = canvas.height_emu();
    format!(
        r#"{XML_DECL}
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr><p:pic><p:nvPicPr><p:cNvPr id="2" name="Page {ordinal}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

fn slide_rels(ordinal: usize) -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image{ordinal}.png"/></Relationships>"#
    )
}
