error_chain! {
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        BadObjectType(t: u8) {
            description("bad object type")
            display("bad object type {}", t)
        }
        InvalidPackfile
        UnsupportedPackfileVersion(v: u32) {
            description("unsupported packfile version")
            display("unsupported packfile version {}", v)
        }
        CorruptedPackfile
        ChecksumMismatch
        CountMismatch(expected: u32, found: u32) {
            description("object count mismatch")
            display("packfile claims {} objects, found {}", expected, found)
        }
        TruncatedDeltaOutput
        BadDeltaBase
        BadDeltaInstruction
        MissingDeltaBase(id: String) {
            description("missing delta base")
            display("missing delta base {}", id)
        }
        CompressionFailed
    }
}
