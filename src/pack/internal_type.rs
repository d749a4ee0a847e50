use crate::id::Id;

#[derive(Debug)]
pub enum PackfileType {
    Plain(Vec<u8>),
    RefDelta((Id, Vec<u8>))
}
