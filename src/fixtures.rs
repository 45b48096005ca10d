//! Small corpora shared by the unit tests

use crate::model::{Corpus, Record};

pub(crate) const DC: &str = "http://purl.org/dc/elements/1.1/";
pub(crate) const OLAC: &str = "http://www.language-archives.org/OLAC/1.1/";
pub(crate) const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

fn corpus(instance: Record) -> Record {
    Record::corpus().id("xc1").child(instance.id("i1"))
}

fn build(record: Record) -> Corpus {
    Corpus::from_record(record).unwrap()
}

fn phrases() -> Record {
    Record::tier()
        .id("p")
        .type_("phrases")
        .child(Record::item().id("p1").text("inu=ga san-biki hoe-ru"))
}

fn translations() -> Record {
    Record::tier()
        .id("t")
        .type_("translations")
        .child(Record::item().id("t1").text("Three dogs bark."))
}

fn language(name: &str, code: &str, text: &str) -> Record {
    Record::meta_child(name)
        .namespace(DC)
        .attribute(format!("{{{}}}type", XSI), "olac:language")
        .attribute(format!("{{{}}}code", OLAC), code)
        .text(text)
}

/// No alignments
pub(crate) fn xc1() -> Corpus {
    build(corpus(Record::instance().child(phrases()).child(translations())))
}

/// No alignments, with namespaced metadata
pub(crate) fn xc1m() -> Corpus {
    let metadata = Record::metadata().id("md1").child(
        Record::meta()
            .id("meta1")
            .child(language("subject", "jpn", "Japanese"))
            .child(language("language", "eng", "English")),
    );
    let instance = Record::instance()
        .add_metadata(metadata)
        .child(phrases())
        .child(translations());
    build(
        corpus(instance)
            .prefix("olac", OLAC)
            .prefix("dc", DC)
            .prefix("xsi", XSI),
    )
}

/// Translation aligned to the phrase
pub(crate) fn xc2() -> Corpus {
    let translations = Record::tier()
        .id("t")
        .type_("translations")
        .alignment("p")
        .child(
            Record::item()
                .id("t1")
                .alignment("p1")
                .text("Three dogs bark."),
        );
    build(corpus(Record::instance().child(phrases()).child(translations)))
}

/// Words, morphemes, glosses, syntax and translation over one phrase
pub(crate) fn xc3() -> Corpus {
    let words = Record::tier()
        .id("w")
        .type_("words")
        .segmentation("p")
        .children([
            Record::item().id("w1").segmentation("p1[0:6]"),
            Record::item().id("w2").segmentation("p1[7:15]"),
            Record::item().id("w3").segmentation("p1[16:22]"),
        ]);
    let morphemes = Record::tier()
        .id("m")
        .type_("morphemes")
        .segmentation("w")
        .children([
            Record::item().id("m1").segmentation("w1[0:3]"),
            Record::item().id("m2").segmentation("w1[4:6]"),
            Record::item().id("m3").segmentation("w2[0:3]"),
            Record::item().id("m4").segmentation("w2[4:8]"),
            Record::item().id("m5").segmentation("w3[0:3]"),
            Record::item().id("m6").segmentation("w3[4:6]"),
        ]);
    let glosses = Record::tier()
        .id("g")
        .type_("glosses")
        .alignment("m")
        .children(
            [
                ("g1", "m1", "dog"),
                ("g2", "m2", "NOM"),
                ("g3", "m3", "three"),
                ("g4", "m4", "NUMCL.animal"),
                ("g5", "m5", "bark"),
                ("g6", "m6", "IMP"),
            ]
            .map(|(id, target, text)| Record::item().id(id).alignment(target).text(text)),
        );
    let syntax = Record::tier()
        .id("x")
        .type_("syntax")
        .alignment("w")
        .attribute("children", "x")
        .children([
            Record::item().id("x1").alignment("w1").text("NP"),
            Record::item().id("x2").alignment("w2").text("NUMCL"),
            Record::item().id("x3").alignment("w3").text("VBZ"),
            Record::item().id("x4").attribute("children", "x1 x2").text("NP"),
            Record::item().id("x5").attribute("children", "x4 x3").text("S"),
        ]);
    let translations = Record::tier()
        .id("t")
        .type_("translations")
        .alignment("p")
        .child(
            Record::item()
                .id("t1")
                .alignment("p1")
                .text("Three dogs bark."),
        );
    build(corpus(
        Record::instance()
            .child(phrases())
            .children([words, morphemes, glosses, syntax, translations]),
    ))
}

/// A tier segmenting itself
pub(crate) fn xc4() -> Corpus {
    build(corpus(
        Record::instance().child(
            Record::tier()
                .id("w")
                .type_("words")
                .segmentation("w")
                .child(Record::item().id("w1").segmentation("w1")),
        ),
    ))
}

/// Two items segmenting each other
pub(crate) fn xc5() -> Corpus {
    build(corpus(
        Record::instance().child(
            Record::tier()
                .id("w")
                .type_("words")
                .segmentation("w")
                .children([
                    Record::item().id("w1").segmentation("w1,w2"),
                    Record::item().id("w2").segmentation("w1,w2"),
                ]),
        ),
    ))
}
