use alloy::sol;

sol! {
    #[sol(abi=true,rpc)]
    #[derive(Debug, PartialEq, Eq)]
   interface IERC20 {
       event Transfer(address indexed from, address indexed to, uint256 value);
       event Approval(address indexed owner, address indexed spender, uint256 value);

       function decimals() external view returns (uint8);
       function symbol() external view returns (string);
       function balanceOf(address account) external view returns (uint256);
       function allowance(address owner, address spender) external view returns (uint256);
       function approve(address spender, uint256 amount) external returns (bool);
       function transfer(address to, uint256 amount) external returns (bool);
   }
}
