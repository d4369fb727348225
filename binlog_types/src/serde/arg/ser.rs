use crate::serde::{write_buf, write_dynalen, ArgType, ArgTypeInt, WriteLen};
use crate::types::Arg;
use anyhow::Result;
use num_traits::ToPrimitive;

impl Arg<'_> {
    pub fn ser(&self, w: &mut impl std::io::Write) -> Result<WriteLen> {
        let mut w_len = 0;

        /* arg_type */
        let atype = ArgTypeInt::from(ArgType::from(self));
        w_len += write_buf(w, &atype.to_le_bytes())?;

        /* arg_body */
        match self {
            Arg::U16(i) => w_len += write_buf(w, &i.to_le_bytes())?,
            Arg::U32(i) => w_len += write_buf(w, &i.to_le_bytes())?,
            Arg::U64(i) => w_len += write_buf(w, &i.to_le_bytes())?,
            Arg::I16(i) => w_len += write_buf(w, &i.to_le_bytes())?,
            Arg::I32(i) => w_len += write_buf(w, &i.to_le_bytes())?,
            Arg::I64(i) => w_len += write_buf(w, &i.to_le_bytes())?,
            Arg::Ptr(p) => w_len += write_buf(w, &p.to_le_bytes())?,
            Arg::Char(c) => w_len += write_buf(w, &u32::from(*c).to_le_bytes())?,
            Arg::Str(s) => w_len += write_dynalen(w, s.as_bytes())?,
            Arg::Bytes(b, mode) => {
                /* slice_mode */
                let mode = mode.to_u8().unwrap();
                w_len += write_buf(w, &[mode])?;

                w_len += write_dynalen(w, b)?;
            }
        }

        Ok(WriteLen::new_manual(w_len))
    }
}
